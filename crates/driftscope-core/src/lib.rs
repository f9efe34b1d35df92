pub mod config;
pub mod drift;
pub mod highlight;
pub mod request;

pub use config::{Config, ConfigError};
pub use drift::{AnalysisResult, Category, DriftItem, ParseError, Severity, parse_provider_text};
pub use highlight::{CandidateMatch, Highlighted, Segment, Span, highlight, locate, segment};
pub use request::{AnalysisRequest, RequestError};
