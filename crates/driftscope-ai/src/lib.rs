//! AI layer: the drift-analysis prompt and the LLM provider that answers it.

mod prompt;
mod provider;

pub use prompt::{MAX_DRIFT_ITEMS, build_prompt};
pub use provider::{AnalysisProvider, ChatProvider, DEFAULT_API_BASE, ProviderError};
