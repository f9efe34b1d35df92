//! DuckDB storage for completed drift analyses.

use std::path::Path;

use arrow::array::{Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use driftscope_core::AnalysisResult;
use duckdb::{Connection, params};
use tracing::info;

use crate::StoreError;
use crate::record::{AnalysisRecord, AnalysisStore, NewAnalysis, now_micros};

const MEMORY_URL: &str = ":memory:";

const SCHEMA: &str = "
    CREATE SEQUENCE IF NOT EXISTS drift_analyses_id_seq START 1;
    CREATE TABLE IF NOT EXISTS drift_analyses (
        id               BIGINT PRIMARY KEY DEFAULT nextval('drift_analyses_id_seq'),
        created_at       TIMESTAMP NOT NULL,
        source_text      VARCHAR NOT NULL,
        translation_text VARCHAR NOT NULL,
        source_lang      VARCHAR NOT NULL,
        translation_lang VARCHAR NOT NULL,
        analysis_json    VARCHAR NOT NULL,
        model_name       VARCHAR NOT NULL
    );";

/// DuckDB store holding one row per analysis in `drift_analyses`.
///
/// `created_at` is stored as a UTC `TIMESTAMP` and `analysis_json` holds the
/// provider payload re-serialized after lenient parsing, so reading it back
/// never depends on the provider's original formatting.
///
/// Use [`open`](Self::open) for an ephemeral database and
/// [`open_persistent`](Self::open_persistent) for a file that survives
/// process restarts. The schema is created on open if missing.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    /// Open from a connection string: `:memory:`, a file path, or a
    /// `duckdb://`-prefixed file path.
    pub fn open_url(connection_string: &str) -> Result<Self, StoreError> {
        let target = connection_string.trim();
        let target = target.strip_prefix("duckdb://").unwrap_or(target);
        if target.is_empty() {
            return Err(StoreError::Other("empty connection string".into()));
        }
        if target == MEMORY_URL {
            Self::open()
        } else {
            Self::open_persistent(Path::new(target))
        }
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of stored analyses.
    pub fn count(&self) -> Result<usize, StoreError> {
        let batches = self.query_arrow("SELECT count(*)::BIGINT AS cnt FROM drift_analyses")?;
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }

    /// Execute arbitrary SQL and return Arrow RecordBatches.
    pub fn query_arrow(&self, sql: &str) -> Result<Vec<RecordBatch>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(batches)
    }
}

impl AnalysisStore for DuckStore {
    fn save(&self, new: NewAnalysis<'_>) -> Result<AnalysisRecord, StoreError> {
        let created_at = now_micros();
        let analysis_json = serde_json::to_string(new.analysis)?;
        let id: i64 = self.conn.query_row(
            "INSERT INTO drift_analyses (
                created_at, source_text, translation_text, source_lang,
                translation_lang, analysis_json, model_name
            ) VALUES (?::TIMESTAMP, ?, ?, ?, ?, ?, ?)
            RETURNING id",
            params![
                created_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
                new.source_text,
                new.translation_text,
                new.analysis.source_language,
                new.analysis.translation_language,
                analysis_json,
                new.model_name,
            ],
            |row| row.get(0),
        )?;
        info!(id, model = new.model_name, "analysis saved");
        Ok(AnalysisRecord::from_new(id, created_at, new))
    }

    fn latest(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError> {
        let sql = format!(
            "SELECT id, epoch_us(created_at)::BIGINT AS created_us, source_text,
                    translation_text, source_lang, translation_lang, analysis_json, model_name
             FROM drift_analyses
             ORDER BY created_at DESC, id DESC
             LIMIT {limit}"
        );
        let batches = self.query_arrow(&sql)?;
        let mut records = Vec::new();
        for batch in &batches {
            records.extend(records_from_batch(batch)?);
        }
        Ok(records)
    }
}

// ── Arrow extraction helpers ──

fn records_from_batch(batch: &RecordBatch) -> Result<Vec<AnalysisRecord>, StoreError> {
    let column = |name: &str| {
        batch
            .column_by_name(name)
            .ok_or_else(|| StoreError::Other(format!("missing '{name}' column")))
    };
    let ids = column("id")?;
    let created = column("created_us")?;
    let source_text = column("source_text")?;
    let translation_text = column("translation_text")?;
    let source_lang = column("source_lang")?;
    let translation_lang = column("translation_lang")?;
    let analysis_json = column("analysis_json")?;
    let model_name = column("model_name")?;

    (0..batch.num_rows())
        .map(|row| {
            let id = get_i64(ids.as_ref(), row)
                .ok_or_else(|| StoreError::Other(format!("null id at row {row}")))?;
            let created_us = get_i64(created.as_ref(), row)
                .ok_or_else(|| StoreError::Other(format!("null created_at at row {row}")))?;
            let created_at = DateTime::from_timestamp_micros(created_us).ok_or_else(|| {
                StoreError::Other(format!("created_at out of range: {created_us}"))
            })?;
            let json = get_string(analysis_json.as_ref(), row).unwrap_or_default();
            let analysis: AnalysisResult = serde_json::from_str(&json)?;
            Ok(AnalysisRecord {
                id,
                created_at,
                source_text: get_string(source_text.as_ref(), row).unwrap_or_default(),
                translation_text: get_string(translation_text.as_ref(), row).unwrap_or_default(),
                source_lang: get_string(source_lang.as_ref(), row).unwrap_or_default(),
                translation_lang: get_string(translation_lang.as_ref(), row).unwrap_or_default(),
                analysis,
                model_name: get_string(model_name.as_ref(), row).unwrap_or_default(),
            })
        })
        .collect()
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Some(arr.value(row).to_string());
    }
    col.as_any()
        .downcast_ref::<LargeStringArray>()
        .map(|arr| arr.value(row).to_string())
}

fn get_i64(col: &dyn Array, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Int64Array>()
        .map(|arr| arr.value(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftscope_core::{Category, DriftItem, Severity};

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            source_language: "English".into(),
            translation_language: "Portuguese".into(),
            drift_items: vec![DriftItem {
                category: Some(Category::Terminology),
                severity: Some(Severity::Medium),
                description: "Brand name translated".into(),
                source_snippet: "Apple".into(),
                translation_snippet: "Maçã".into(),
            }],
        }
    }

    fn save(store: &DuckStore, source: &str, analysis: &AnalysisResult) -> AnalysisRecord {
        store
            .save(NewAnalysis {
                source_text: source,
                translation_text: "A Maçã lançou",
                analysis,
                model_name: "gpt-4o-mini",
            })
            .unwrap()
    }

    #[test]
    fn open_in_memory_creates_schema() {
        let store = DuckStore::open().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.latest(5).unwrap().is_empty());
    }

    #[test]
    fn open_url_variants() {
        assert!(DuckStore::open_url(":memory:").is_ok());
        assert!(DuckStore::open_url("duckdb://:memory:").is_ok());
        assert!(matches!(DuckStore::open_url("  "), Err(StoreError::Other(_))));
    }

    #[test]
    fn save_then_latest_reads_back() {
        let store = DuckStore::open().unwrap();
        let analysis = analysis();
        let saved = save(&store, "Apple launched", &analysis);
        assert_eq!(saved.id, 1);

        let latest = store.latest(5).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0], saved);
        assert_eq!(latest[0].analysis.drift_items[0].translation_snippet, "Maçã");
    }

    #[test]
    fn latest_newest_first_with_limit() {
        let store = DuckStore::open().unwrap();
        let analysis = analysis();
        for i in 0..7 {
            save(&store, &format!("source {i}"), &analysis);
        }
        assert_eq!(store.count().unwrap(), 7);
        let ids: Vec<i64> = store.latest(5).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn quotes_in_text_are_stored_verbatim() {
        let store = DuckStore::open().unwrap();
        let saved = save(&store, "it's a 'quoted'; DROP TABLE x", &analysis());
        let latest = store.latest(1).unwrap();
        assert_eq!(latest[0].source_text, saved.source_text);
    }

    // ── Persistent storage tests ──

    #[test]
    fn persistent_save_and_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("drift.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        let saved = save(&store, "Apple launched", &analysis());
        drop(store);
        assert!(db_path.exists());

        let store = DuckStore::open_url(db_path.to_str().unwrap()).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.latest(5).unwrap()[0], saved);

        // The id sequence continues across reopen.
        let next = save(&store, "Apple again", &analysis());
        assert_eq!(next.id, 2);
    }
}
