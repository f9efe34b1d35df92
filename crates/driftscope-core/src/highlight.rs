//! Drift span resolution and segmentation.
//!
//! Turns the provider's free-text snippets into an ordered, non-overlapping
//! list of [`Segment`]s that covers the translation exactly once:
//!
//! 1. [`locate`] finds the first exact occurrence of each item's
//!    `translation_snippet` and drops items that have none.
//! 2. [`segment`] sorts the candidates by start offset (stable), keeps the
//!    earliest of any overlapping group, and fills the gaps with plain text.
//!
//! Offsets are UTF-8 byte offsets and always fall on char boundaries.
//! Nothing here fails: bad input only ever reduces the amount of
//! highlighting.

use serde::Serialize;
use tracing::{debug, trace};

use crate::drift::{AnalysisResult, DriftItem, Severity};

/// Half-open byte range `[start, end)` into the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this span can be sliced out of `text` without panicking.
    fn fits(&self, text: &str) -> bool {
        !self.is_empty()
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }
}

/// A located drift snippet, before overlap resolution.
///
/// `severity` is `None` when the provider sent a missing or unknown value;
/// such a match still claims its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatch {
    pub span: Span,
    pub severity: Option<Severity>,
}

/// A contiguous slice of the translation, optionally severity-tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Segment {
    fn slice(text: &str, span: Span, severity: Option<Severity>) -> Self {
        Self {
            text: text[span.start..span.end].to_string(),
            span,
            severity,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.severity.is_some()
    }
}

/// Segments plus the language captions passed through from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlighted {
    pub source_language: String,
    pub translation_language: String,
    pub segments: Vec<Segment>,
}

impl Highlighted {
    pub fn new(translation: &str, analysis: &AnalysisResult) -> Self {
        Self {
            source_language: analysis.source_language.clone(),
            translation_language: analysis.translation_language.clone(),
            segments: highlight(translation, &analysis.drift_items),
        }
    }
}

/// Resolve `items` against `translation` and segment it in one go.
pub fn highlight(translation: &str, items: &[DriftItem]) -> Vec<Segment> {
    segment(translation, locate(translation, items))
}

/// Find the first occurrence of each item's translation snippet.
///
/// Items with an empty snippet, or whose snippet does not occur verbatim,
/// are skipped. Surviving matches keep the input order.
pub fn locate(translation: &str, items: &[DriftItem]) -> Vec<CandidateMatch> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let snippet = item.translation_snippet.as_str();
            if snippet.is_empty() {
                trace!(index, "drift item has no translation snippet");
                return None;
            }
            let Some(start) = translation.find(snippet) else {
                debug!(index, snippet, "translation snippet not found");
                return None;
            };
            Some(CandidateMatch {
                span: Span::new(start, start + snippet.len()),
                severity: item.severity,
            })
        })
        .collect()
}

/// Split `translation` into ordered segments around the given matches.
///
/// Matches are stably sorted by start; a match starting before the end of
/// the previously accepted one is discarded (first wins, no merging).
/// An empty translation yields no segments.
pub fn segment(translation: &str, mut matches: Vec<CandidateMatch>) -> Vec<Segment> {
    matches.sort_by_key(|m| m.span.start);

    let (mut segments, cursor) =
        matches
            .into_iter()
            .fold((Vec::new(), 0usize), |(mut out, cursor), m| {
                if !m.span.fits(translation) {
                    debug!(start = m.span.start, end = m.span.end, "match outside translation");
                    return (out, cursor);
                }
                if m.span.start < cursor {
                    trace!(
                        start = m.span.start,
                        end = m.span.end,
                        cursor,
                        "overlapping match discarded"
                    );
                    return (out, cursor);
                }
                if m.span.start > cursor {
                    out.push(Segment::slice(
                        translation,
                        Span::new(cursor, m.span.start),
                        None,
                    ));
                }
                out.push(Segment::slice(translation, m.span, m.severity));
                (out, m.span.end)
            });

    if cursor < translation.len() {
        segments.push(Segment::slice(
            translation,
            Span::new(cursor, translation.len()),
            None,
        ));
    }
    segments
}
