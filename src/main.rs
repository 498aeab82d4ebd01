//! JALU - Meal Nutrition Estimation
//!
//! An MCP server that turns detected food objects into meal nutrition estimates.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use jalu::build_info;
use jalu::config::Config;
use jalu::detection::{Detector, HttpDetector};
use jalu::mcp::JaluService;
use jalu::nutrition::NutritionTable;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jalu=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!("Output directory: {}", config.output_dir.display());

    // Load the nutrition table once; it is shared read-only by every request
    let table = NutritionTable::load(config.nutrition_csv.as_deref())?;
    eprintln!("Nutrition table: {} ({} records)", table.source(), table.len());

    let detector: Option<Arc<dyn Detector>> = match &config.detector_url {
        Some(url) => {
            let detector = HttpDetector::new(url.clone(), config.detector_timeout)?;
            eprintln!("Object detector: {}", detector.url());
            Some(Arc::new(detector))
        }
        None => {
            eprintln!("Object detector: not configured, photo analysis disabled");
            None
        }
    };

    // Create the JALU service
    let service = JaluService::new(Arc::new(config), Arc::new(table), detector);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
