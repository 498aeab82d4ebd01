//! Program overview
//!
//! Headline figures of the MBG (free nutritious meals) program.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProgramMetric {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: &'static str,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramOverview {
    pub program: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub metrics: Vec<ProgramMetric>,
}

pub fn program_overview() -> ProgramOverview {
    ProgramOverview {
        program: "JALU - Platform MBG Terpadu",
        tagline: "Building a golden generation through balanced nutrition",
        description: "AI-assisted monitoring of the Makan Bergizi Gratis (free nutritious meals) \
                      program and of nutrition distribution in Indonesian schools.",
        metrics: vec![
            ProgramMetric {
                icon: "👥",
                label: "Beneficiaries",
                value: "55.1 million",
                note: "+12%",
            },
            ProgramMetric {
                icon: "💰",
                label: "Budget",
                value: "Rp 335 T",
                note: "Year 2026",
            },
            ProgramMetric {
                icon: "🎯",
                label: "Stunting target",
                value: "14%",
                note: "National target",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_headline_metrics() {
        let overview = program_overview();
        let values: Vec<&str> = overview.metrics.iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["55.1 million", "Rp 335 T", "14%"]);
        assert_eq!(overview.metrics[1].note, "Year 2026");
    }
}
