//! JALU MCP Server Implementation
//!
//! Exposes the nutrition table, meal estimation and reporting as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::detection::Detector;
use crate::nutrition::NutritionTable;
use crate::tools::meals::{self, timestamped_output_path};
use crate::tools::status::StatusTracker;
use crate::tools::{foods, program, reports};

const MIN_CHART_SIDE: u32 = 200;
const MAX_CHART_SIDE: u32 = 4000;

/// JALU MCP Service
///
/// Every dependency is built by the caller and injected here.
#[derive(Clone)]
pub struct JaluService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    table: Arc<NutritionTable>,
    detector: Option<Arc<dyn Detector>>,
    config: Arc<Config>,
    tool_router: ToolRouter<JaluService>,
}

impl JaluService {
    pub fn new(
        config: Arc<Config>,
        table: Arc<NutritionTable>,
        detector: Option<Arc<dyn Detector>>,
    ) -> Self {
        let tracker = StatusTracker::new(
            table.source().clone(),
            table.len(),
            detector.as_ref().map(|d| d.describe()),
            config.min_confidence,
            config.output_dir.display().to_string(),
        );

        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            table,
            detector,
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn output_path(&self, requested: Option<String>, prefix: &str, extension: &str) -> PathBuf {
        requested
            .map(PathBuf::from)
            .unwrap_or_else(|| timestamped_output_path(&self.config.output_dir, prefix, extension))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupFoodParams {
    /// Food label as produced by a detector (case-insensitive), e.g. "banana"
    pub label: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateNutritionParams {
    /// Detected labels, one entry per detected object (repeats count)
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeMealPhotoParams {
    /// Path to a JPG or PNG meal photo
    pub image_path: String,
    /// Where to save the annotated photo (default: timestamped file in the output directory)
    pub output_path: Option<String>,
    /// Save a copy of the photo with detection boxes drawn (default true)
    #[serde(default = "default_true")]
    pub save_annotated: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenderMacroChartParams {
    /// Detected labels, one entry per detected object
    pub labels: Vec<String>,
    /// Output PNG path (default: timestamped file in the output directory)
    pub output_path: Option<String>,
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

fn default_chart_width() -> u32 { reports::DEFAULT_CHART_WIDTH }
fn default_chart_height() -> u32 { reports::DEFAULT_CHART_HEIGHT }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateMealReportParams {
    /// Detected labels, one entry per detected object
    pub labels: Vec<String>,
    /// Output PDF path (default: timestamped file in the output directory)
    pub output_path: Option<String>,
    /// Report title (default "Meal Nutrition Report")
    pub title: Option<String>,
    /// Free-text notes printed at the bottom of the report
    pub notes: Option<Vec<String>>,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl JaluService {
    // --- Status ---

    #[tool(description = "Get the current status of the JALU service including build info, nutrition table, detector configuration and process information")]
    async fn jalu_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for estimating meal nutrition. Call this when unsure how labels are matched or which tool to use.")]
    fn nutrition_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::NUTRITION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(NUTRITION_INSTRUCTIONS)]))
    }

    #[tool(description = "Get the headline figures of the MBG free nutritious meals program")]
    fn program_overview(&self) -> Result<CallToolResult, McpError> {
        to_json(&program::program_overview())
    }

    // --- Nutrition Table ---

    #[tool(description = "List every food in the nutrition table with its portion and macro-nutrients")]
    fn list_foods(&self) -> Result<CallToolResult, McpError> {
        to_json(&foods::list_foods(&self.table))
    }

    #[tool(description = "Look up one food label in the nutrition table (exact, case-insensitive match)")]
    fn lookup_food(&self, Parameters(p): Parameters<LookupFoodParams>) -> Result<CallToolResult, McpError> {
        match foods::lookup_food(&self.table, &p.label) {
            Some(found) => to_json(&found),
            None => to_json(&serde_json::json!({
                "error": "Food not found in nutrition table",
                "label": p.label,
            })),
        }
    }

    // --- Meal Estimation ---

    #[tool(description = "Estimate meal nutrition from detected food labels. Unknown labels are ignored; repeated labels count once per occurrence.")]
    fn estimate_nutrition(&self, Parameters(p): Parameters<EstimateNutritionParams>) -> Result<CallToolResult, McpError> {
        to_json(&meals::estimate_nutrition(&self.table, &p.labels))
    }

    #[tool(description = "Detect food objects in a meal photo (JPG/PNG) and estimate its nutrition. Saves an annotated copy of the photo with detection boxes.")]
    async fn analyze_meal_photo(&self, Parameters(p): Parameters<AnalyzeMealPhotoParams>) -> Result<CallToolResult, McpError> {
        let result = meals::analyze_meal_photo(
            &self.table,
            self.detector.as_deref(),
            &self.config,
            &p.image_path,
            p.output_path.as_deref(),
            p.save_annotated,
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Reports ---

    #[tool(description = "Render a protein/carbs/fat bar chart (PNG) for the given detected labels")]
    fn render_macro_chart(&self, Parameters(p): Parameters<RenderMacroChartParams>) -> Result<CallToolResult, McpError> {
        let path = self.output_path(p.output_path, "macro_chart", "png");
        let width = p.width.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE);
        let height = p.height.clamp(MIN_CHART_SIDE, MAX_CHART_SIDE);
        let result = reports::render_macro_chart(&self.table, &p.labels, &path, width, height)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Generate a one-page PDF meal report (totals, per-item breakdown, macro chart) for the given detected labels")]
    fn generate_meal_report(&self, Parameters(p): Parameters<GenerateMealReportParams>) -> Result<CallToolResult, McpError> {
        let path = self.output_path(p.output_path, "meal_report", "pdf");
        let result = reports::generate_meal_report(&self.table, &p.labels, &path, p.title.as_deref(), p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for JaluService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jalu".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("JALU Meal Nutrition".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "JALU - meal nutrition estimation for the MBG free nutritious meals program. \
                 Call nutrition_instructions first if unsure. \
                 Photos: analyze_meal_photo. Labels: estimate_nutrition. \
                 Table: list_foods, lookup_food. \
                 Reports: render_macro_chart, generate_meal_report. \
                 Info: program_overview, jalu_status."
                    .into(),
            ),
        }
    }
}
