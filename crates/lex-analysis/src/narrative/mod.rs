//! Narrative generation over analysis results.
//!
//! The analysis core stops at structured results; turning them into prose is
//! delegated to a [`NarrativeProvider`]. The provider receives a
//! [`DatasetSummary`] built from the report and the user's query.
//!
//! - [`TemplateNarrator`] - deterministic local text, always available
//! - [`OpenRouterNarrator`] - OpenRouter-hosted LLM (requires `ai` feature)
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::narrative::{DatasetSummary, NarrativeProvider, TemplateNarrator};
//!
//! let report = lex_analysis::analyze(&df, "What changed this month?")?;
//! let summary = DatasetSummary::from_report(&df, &report);
//! let text = TemplateNarrator::new().generate_narrative(&summary, "What changed this month?")?;
//! ```

mod provider;
mod summary;
mod template;

pub use provider::NarrativeProvider;
pub use summary::DatasetSummary;
pub use template::TemplateNarrator;

// Remote providers require the "ai" feature
#[cfg(feature = "ai")]
mod openrouter;

#[cfg(feature = "ai")]
pub use openrouter::{OpenRouterConfig, OpenRouterConfigBuilder, OpenRouterNarrator};
