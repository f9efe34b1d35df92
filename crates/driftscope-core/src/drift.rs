//! Drift analysis payload as returned by the analysis provider.
//!
//! The provider is a free-text generator, so none of its output is trusted.
//! Every field is read leniently: unknown enum values become `None`, missing
//! or non-string text becomes `""`, and a missing or non-array `drift_items`
//! becomes an empty list. Only a payload that is not a JSON object at all is
//! rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("provider output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider output is not a JSON object")]
    NotAnObject,
}

/// How serious a drift item is. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Severity::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Kind of discrepancy between source and translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Meaning,
    Tone,
    Terminology,
    Grammar,
    Style,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Meaning,
        Category::Tone,
        Category::Terminology,
        Category::Grammar,
        Category::Style,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meaning => "Meaning",
            Category::Tone => "Tone",
            Category::Terminology => "Terminology",
            Category::Grammar => "Grammar",
            Category::Style => "Style",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A single discrepancy reported by the provider.
///
/// Deserialization never fails: any JSON value (including non-objects)
/// yields a `DriftItem`, with unreadable fields left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftItem {
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub description: String,
    pub source_snippet: String,
    pub translation_snippet: String,
}

impl DriftItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            category: text_field(value, "category").and_then(|s| s.parse().ok()),
            severity: text_field(value, "severity").and_then(|s| s.parse().ok()),
            description: owned_field(value, "description"),
            source_snippet: owned_field(value, "source_snippet"),
            translation_snippet: owned_field(value, "translation_snippet"),
        }
    }
}

impl<'de> Deserialize<'de> for DriftItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// The provider's full answer for one `(source, translation)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub translation_language: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub drift_items: Vec<DriftItem>,
}

impl AnalysisResult {
    /// Build from an already-parsed JSON value. Only non-objects are rejected.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        if !value.is_object() {
            return Err(ParseError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Parse the raw text reply of the provider.
///
/// A surrounding markdown code fence (```` ```json ... ``` ````) is tolerated.
pub fn parse_provider_text(text: &str) -> Result<AnalysisResult, ParseError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))?;
    AnalysisResult::from_value(value)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // An info string ("json") is a bare word right after the opening fence.
    let word_end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    rest[word_end..].trim()
}

fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str()
}

fn owned_field(value: &Value, key: &str) -> String {
    text_field(value, key).unwrap_or_default().to_string()
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DriftItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(DriftItem::from_value).collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_payload() {
        let text = r#"{
            "source_language": "English",
            "translation_language": "French",
            "drift_items": [
                {
                    "category": "Meaning",
                    "severity": "High",
                    "description": "Negation lost",
                    "source_snippet": "not allowed",
                    "translation_snippet": "autorisé"
                }
            ]
        }"#;
        let parsed = parse_provider_text(text).unwrap();
        assert_eq!(parsed.source_language, "English");
        assert_eq!(parsed.translation_language, "French");
        assert_eq!(parsed.drift_items.len(), 1);
        let item = &parsed.drift_items[0];
        assert_eq!(item.category, Some(Category::Meaning));
        assert_eq!(item.severity, Some(Severity::High));
        assert_eq!(item.translation_snippet, "autorisé");
    }

    #[test]
    fn fenced_payload() {
        let text = "```json\n{\"source_language\": \"German\", \"drift_items\": []}\n```";
        let parsed = parse_provider_text(text).unwrap();
        assert_eq!(parsed.source_language, "German");
        assert!(parsed.drift_items.is_empty());
    }

    #[test]
    fn bare_fence_without_info_string() {
        let text = "```\n{\"translation_language\": \"Dutch\"}\n```";
        let parsed = parse_provider_text(text).unwrap();
        assert_eq!(parsed.translation_language, "Dutch");
    }

    #[test]
    fn fence_opening_directly_on_json() {
        let text = "```{\n\"source_language\": \"Greek\"}\n```";
        let parsed = parse_provider_text(text).unwrap();
        assert_eq!(parsed.source_language, "Greek");
    }

    #[test]
    fn single_line_fence_with_info_string() {
        let text = "```json {\"source_language\": \"Czech\"}```";
        let parsed = parse_provider_text(text).unwrap();
        assert_eq!(parsed.source_language, "Czech");
    }

    #[test]
    fn malformed_fields_degrade() {
        let value = json!({
            "source_language": 42,
            "drift_items": [
                { "severity": "Critical", "category": "Spelling", "translation_snippet": 7 },
                "not an object",
                { "severity": "low", "translation_snippet": "chat" }
            ]
        });
        let parsed = AnalysisResult::from_value(value).unwrap();
        assert_eq!(parsed.source_language, "");
        assert_eq!(parsed.translation_language, "");
        assert_eq!(parsed.drift_items.len(), 3);

        assert_eq!(parsed.drift_items[0].severity, None);
        assert_eq!(parsed.drift_items[0].category, None);
        assert_eq!(parsed.drift_items[0].translation_snippet, "");

        assert_eq!(parsed.drift_items[1], DriftItem::default());

        assert_eq!(parsed.drift_items[2].severity, Some(Severity::Low));
        assert_eq!(parsed.drift_items[2].translation_snippet, "chat");
    }

    #[test]
    fn drift_items_not_an_array() {
        let parsed = AnalysisResult::from_value(json!({ "drift_items": "none" })).unwrap();
        assert!(parsed.drift_items.is_empty());

        let parsed = AnalysisResult::from_value(json!({})).unwrap();
        assert!(parsed.drift_items.is_empty());
    }

    #[test]
    fn non_object_rejected() {
        assert!(matches!(
            parse_provider_text("[1, 2, 3]"),
            Err(ParseError::NotAnObject)
        ));
        assert!(matches!(
            parse_provider_text("Sure! Here is the analysis"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn enum_parsing() {
        assert_eq!(" MEDIUM ".parse::<Severity>(), Ok(Severity::Medium));
        assert!("Severe".parse::<Severity>().is_err());
        assert_eq!("terminology".parse::<Category>(), Ok(Category::Terminology));
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn severity_orders_high_first() {
        let mut v = vec![Severity::Low, Severity::High, Severity::Medium];
        v.sort();
        assert_eq!(v, vec![Severity::High, Severity::Medium, Severity::Low]);
    }

    #[test]
    fn stored_payload_reads_back() {
        let original = AnalysisResult {
            source_language: "Spanish".into(),
            translation_language: "English".into(),
            drift_items: vec![DriftItem {
                category: Some(Category::Tone),
                severity: Some(Severity::Medium),
                description: "Too formal".into(),
                source_snippet: "oye".into(),
                translation_snippet: "excuse me".into(),
            }],
        };
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"severity\":\"Medium\""));
        assert_eq!(parse_provider_text(&json).unwrap(), original);
    }
}
