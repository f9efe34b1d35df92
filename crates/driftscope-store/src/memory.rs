//! In-process store. Used in tests.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::StoreError;
use crate::record::{AnalysisRecord, AnalysisStore, NewAnalysis, now_micros};

#[derive(Default)]
struct Rows {
    next_id: i64,
    records: Vec<AnalysisRecord>,
}

/// Keeps analyses in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows().map(|r| r.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> Result<MutexGuard<'_, Rows>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Other("memory store lock poisoned".into()))
    }
}

impl AnalysisStore for MemoryStore {
    fn save(&self, new: NewAnalysis<'_>) -> Result<AnalysisRecord, StoreError> {
        let mut rows = self.rows()?;
        rows.next_id += 1;
        let record = AnalysisRecord::from_new(rows.next_id, now_micros(), new);
        rows.records.push(record.clone());
        debug!(id = record.id, "analysis saved in memory");
        Ok(record)
    }

    fn latest(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError> {
        let rows = self.rows()?;
        let mut records: Vec<&AnalysisRecord> = rows.records.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftscope_core::{AnalysisResult, DriftItem, Severity};

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            source_language: "English".into(),
            translation_language: "French".into(),
            drift_items: vec![DriftItem {
                severity: Some(Severity::High),
                translation_snippet: "chien".into(),
                ..Default::default()
            }],
        }
    }

    fn save(store: &MemoryStore, source: &str, analysis: &AnalysisResult) -> AnalysisRecord {
        store
            .save(NewAnalysis {
                source_text: source,
                translation_text: "le chien",
                analysis,
                model_name: "gpt-4o-mini",
            })
            .unwrap()
    }

    #[test]
    fn save_assigns_ids_and_languages() {
        let store = MemoryStore::new();
        let analysis = analysis();
        let first = save(&store, "the dog", &analysis);
        let second = save(&store, "the cat", &analysis);
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.source_lang, "English");
        assert_eq!(first.translation_lang, "French");
        assert_eq!(first.model_name, "gpt-4o-mini");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn latest_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        let analysis = analysis();
        for i in 0..7 {
            save(&store, &format!("text {i}"), &analysis);
        }
        let latest = store.latest(5).unwrap();
        let ids: Vec<i64> = latest.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn latest_on_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.latest(5).unwrap().is_empty());
    }

    #[test]
    fn record_rehighlights_translation() {
        let store = MemoryStore::new();
        let record = save(&store, "the dog", &analysis());
        let highlighted = record.highlighted();
        assert_eq!(highlighted.segments.len(), 2);
        assert_eq!(highlighted.segments[1].text, "chien");
        assert_eq!(highlighted.segments[1].severity, Some(Severity::High));
    }
}
