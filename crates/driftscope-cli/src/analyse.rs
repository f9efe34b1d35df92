//! Analysis pipeline: provider call → store → highlight.

use std::path::Path;

use anyhow::Context;
use driftscope_ai::AnalysisProvider;
use driftscope_core::{AnalysisRequest, Highlighted};
use driftscope_store::{AnalysisRecord, AnalysisStore, NewAnalysis};
use serde_json::json;
use tracing::info;

pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    pub highlighted: Highlighted,
}

/// Run one analysis end to end. Nothing is stored when the provider fails.
pub async fn run_analysis(
    provider: &dyn AnalysisProvider,
    store: &dyn AnalysisStore,
    request: &AnalysisRequest,
) -> anyhow::Result<AnalysisOutcome> {
    let analysis = provider
        .analyse(request)
        .await
        .context("drift analysis failed")?;

    let record = store
        .save(NewAnalysis {
            source_text: &request.source,
            translation_text: &request.translation,
            analysis: &analysis,
            model_name: provider.model_name(),
        })
        .context("saving analysis")?;

    let highlighted = record.highlighted();
    let highlighted_count = highlighted
        .segments
        .iter()
        .filter(|s| s.is_highlighted())
        .count();
    info!(
        id = record.id,
        items = analysis.drift_items.len(),
        highlighted = highlighted_count,
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        record,
        highlighted,
    })
}

/// Take text given inline, or read it from a file.
pub fn read_text(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => anyhow::bail!("no text given"),
    }
}

/// `{input, output, meta}` document describing a completed analysis.
pub fn response_json(outcome: &AnalysisOutcome) -> serde_json::Value {
    let record = &outcome.record;
    json!({
        "input": {
            "source": record.source_text,
            "translation": record.translation_text,
        },
        "output": record.analysis,
        "meta": {
            "id": record.id,
            "created_at": record.created_at.to_rfc3339(),
            "model_name": record.model_name,
        },
        "segments": outcome.highlighted.segments,
    })
}
