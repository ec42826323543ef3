//! Narrative provider trait.
//!
//! A provider turns a [`DatasetSummary`] and the user's query into prose.
//! Implementations may call out to an LLM or render locally.

use super::DatasetSummary;
use anyhow::Result;

/// Trait for backends that write a narrative over analysis results.
///
/// Implementations must be `Send + Sync` so one provider can serve analyses
/// running on several threads. Configuration is passed at construction;
/// providers never read ambient state.
pub trait NarrativeProvider: Send + Sync {
    /// Write a narrative answering `query` from the summarized results.
    ///
    /// # Errors
    ///
    /// Returns an error when the narrative cannot be produced. Providers that
    /// have a local fallback should use it rather than fail.
    fn generate_narrative(&self, summary: &DatasetSummary, query: &str) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't use a model.
    fn model(&self) -> Option<&str> {
        None
    }
}
