//! The persisted shape of a completed analysis and the store contract.

use chrono::{DateTime, Utc};
use driftscope_core::{AnalysisResult, Highlighted};
use serde::Serialize;

use crate::StoreError;

/// Number of records shown in the "recent analyses" list.
pub const LATEST_LIMIT: usize = 5;

/// One analysis as written by [`AnalysisStore::save`].
#[derive(Debug, Clone, Copy)]
pub struct NewAnalysis<'a> {
    pub source_text: &'a str,
    pub translation_text: &'a str,
    pub analysis: &'a AnalysisResult,
    pub model_name: &'a str,
}

/// A stored analysis with its assigned id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub source_text: String,
    pub translation_text: String,
    pub source_lang: String,
    pub translation_lang: String,
    pub analysis: AnalysisResult,
    pub model_name: String,
}

impl AnalysisRecord {
    pub(crate) fn from_new(id: i64, created_at: DateTime<Utc>, new: NewAnalysis<'_>) -> Self {
        Self {
            id,
            created_at,
            source_text: new.source_text.to_string(),
            translation_text: new.translation_text.to_string(),
            source_lang: new.analysis.source_language.clone(),
            translation_lang: new.analysis.translation_language.clone(),
            analysis: new.analysis.clone(),
            model_name: new.model_name.to_string(),
        }
    }

    /// Re-run highlighting over the stored translation.
    pub fn highlighted(&self) -> Highlighted {
        Highlighted::new(&self.translation_text, &self.analysis)
    }
}

/// Durable record of completed analyses.
pub trait AnalysisStore {
    /// Persist one analysis and return it with its id and timestamp.
    fn save(&self, new: NewAnalysis<'_>) -> Result<AnalysisRecord, StoreError>;

    /// The `limit` most recent analyses, newest first.
    fn latest(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError>;
}

/// Current time truncated to microseconds, the precision the stores keep.
pub(crate) fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}
