//! Deterministic, offline narrative.

use super::{DatasetSummary, NarrativeProvider};
use anyhow::Result;

/// Renders a fixed-layout narrative from the summary alone.
///
/// Used when no LLM is configured and as the fallback for LLM providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn new() -> Self {
        Self
    }

    /// Render the narrative. Never fails.
    pub fn render(&self, summary: &DatasetSummary, query: &str) -> String {
        let mut text = format!("Question: {}\n\n", query.trim());

        text.push_str(&format!(
            "Overview: {} rows across {} columns, analyzed as {} data ({:.1}% complete).\n",
            summary.row_count,
            summary.column_count,
            summary.analysis_type.replace('_', " "),
            summary.completeness_score
        ));

        let groups = [
            ("Datetime", &summary.datetime_columns),
            ("Numeric", &summary.numeric_columns),
            ("Categorical", &summary.categorical_columns),
        ];
        for (label, columns) in groups {
            if !columns.is_empty() {
                text.push_str(&format!("{label} columns: {}\n", columns.join(", ")));
            }
        }

        text.push_str("\nKey findings:\n");
        if summary.highlights.is_empty() {
            text.push_str("- No notable findings.\n");
        } else {
            for highlight in &summary.highlights {
                text.push_str(&format!("- {highlight}\n"));
            }
        }

        text
    }
}

impl NarrativeProvider for TemplateNarrator {
    fn generate_narrative(&self, summary: &DatasetSummary, query: &str) -> Result<String> {
        Ok(self.render(summary, query))
    }

    fn name(&self) -> &str {
        "Template"
    }
}
