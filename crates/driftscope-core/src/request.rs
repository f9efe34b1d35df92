use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("both source and translation are required ({0} is empty)")]
    MissingText(&'static str),
}

/// A validated `(source, translation)` pair ready for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub source: String,
    pub translation: String,
}

impl AnalysisRequest {
    /// Both texts must contain something other than whitespace. They are
    /// kept verbatim otherwise, since span offsets index into them.
    pub fn new(
        source: impl Into<String>,
        translation: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let source = source.into();
        let translation = translation.into();
        if source.trim().is_empty() {
            return Err(RequestError::MissingText("source"));
        }
        if translation.trim().is_empty() {
            return Err(RequestError::MissingText("translation"));
        }
        Ok(Self {
            source,
            translation,
        })
    }
}
