//! Incremental result persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rustc_hash::FxHashSet;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::record::{EntryKey, ResultEntry, ResultSet};

/// Destination for result entries.
///
/// `record` is idempotent per [`EntryKey`]: entries already stored are
/// skipped, so re-recording after a crash never duplicates lines.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist new entries; returns how many were actually written.
    async fn record(&self, entries: &[ResultEntry]) -> StoreResult<usize>;

    /// Everything stored so far, in insertion order.
    async fn load(&self) -> StoreResult<ResultSet>;

    /// Human-readable location for messages.
    fn location(&self) -> String;
}

/// Keep only entries whose key is new, marking them as seen.
fn fresh<'a>(entries: &'a [ResultEntry], seen: &mut FxHashSet<EntryKey>) -> Vec<&'a ResultEntry> {
    entries.iter().filter(|e| seen.insert(e.key())).collect()
}

// =============================================================================
// JSON Lines file
// =============================================================================

/// Append-only JSON Lines file, one [`ResultEntry`] per line.
///
/// Every `record` call appends and then syncs the file, so a crash loses at
/// most the batch being written. A torn final line left by such a crash is
/// dropped when the store is reopened.
pub struct JsonlStore {
    path: PathBuf,
    keys: Mutex<FxHashSet<EntryKey>>,
}

impl JsonlStore {
    /// Open `<dir>/<run_name>.jsonl`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>, run_name: &str) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        Self::open_file(dir.join(format!("{run_name}.jsonl"))).await
    }

    /// Open a result file at an explicit path.
    pub async fn open_file(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut keys = FxHashSet::default();

        match fs::read_to_string(&path).await {
            Ok(content) => {
                if let Some(keep) = torn_tail_start(&content) {
                    tracing::warn!(
                        "Dropping torn trailing record in {} ({} bytes)",
                        path.display(),
                        content.len() - keep
                    );
                    let file = fs::OpenOptions::new().write(true).open(&path).await?;
                    file.set_len(keep as u64).await?;
                    file.sync_all().await?;
                }
                if missing_final_newline(&content) {
                    tracing::debug!("Terminating last record in {}", path.display());
                    let mut file = fs::OpenOptions::new().append(true).open(&path).await?;
                    file.write_all(b"\n").await?;
                    file.sync_all().await?;
                }
                for entry in parse_lines(&path, &content)? {
                    keys.insert(entry.key());
                }
                tracing::debug!("Resuming {} with {} entries", path.display(), keys.len());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Io(e)),
        }

        Ok(Self {
            path,
            keys: Mutex::new(keys),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a result file without opening it for writing.
    ///
    /// A torn final line is skipped with a warning; any other malformed line
    /// is an error.
    pub async fn read(path: impl AsRef<Path>) -> StoreResult<ResultSet> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Ok(parse_lines(path, &content)?.into_iter().collect())
    }
}

/// Byte offset where an unterminated, unparsable last line starts.
fn torn_tail_start(content: &str) -> Option<usize> {
    if content.is_empty() || content.ends_with('\n') {
        return None;
    }
    let start = content.rfind('\n').map_or(0, |i| i + 1);
    let tail = &content[start..];
    if serde_json::from_str::<ResultEntry>(tail).is_ok() {
        return None;
    }
    Some(start)
}

/// The last line is a complete record that lost its newline. Appending
/// after it as-is would glue two records onto one line.
fn missing_final_newline(content: &str) -> bool {
    !content.is_empty() && !content.ends_with('\n') && torn_tail_start(content).is_none()
}

fn parse_lines(path: &Path, content: &str) -> StoreResult<Vec<ResultEntry>> {
    let lines: Vec<&str> = content.lines().collect();
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let torn_possible = !content.ends_with('\n');

    let mut entries = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ResultEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) if torn_possible && Some(i) == last => {
                tracing::warn!("Skipping torn record at {}:{}: {}", path.display(), i + 1, e);
            }
            Err(e) => {
                return Err(StoreError::Corrupt {
                    path: path.to_path_buf(),
                    line: i + 1,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(entries)
}

#[async_trait]
impl ResultStore for JsonlStore {
    async fn record(&self, entries: &[ResultEntry]) -> StoreResult<usize> {
        let mut keys = self.keys.lock().await;

        let mut seen = keys.clone();
        let new = fresh(entries, &mut seen);
        if new.is_empty() {
            return Ok(0);
        }

        let mut buf = String::new();
        for entry in &new {
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.sync_all().await?;

        // Only remember keys once they are durable.
        *keys = seen;
        tracing::debug!("Recorded {} entries to {}", new.len(), self.path.display());
        Ok(new.len())
    }

    async fn load(&self) -> StoreResult<ResultSet> {
        match Self::read(&self.path).await {
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(ResultSet::new())
            }
            other => other,
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// In memory
// =============================================================================

/// Store that keeps entries in memory, for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<(ResultSet, FxHashSet<EntryKey>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn record(&self, entries: &[ResultEntry]) -> StoreResult<usize> {
        let mut guard = self.inner.lock().await;
        let (set, keys) = &mut *guard;
        let new = fresh(entries, keys);
        let written = new.len();
        set.extend(new.into_iter().cloned());
        Ok(written)
    }

    async fn load(&self) -> StoreResult<ResultSet> {
        Ok(self.inner.lock().await.0.clone())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FailureStage, RunResult, SweepFailure};
    use qbench_hal::{BackendConfig, Precision};
    use std::time::Duration;

    fn run(qubits: u32) -> ResultEntry {
        RunResult::ok(qubits, BackendConfig::cpu(Precision::Double), &[Duration::from_millis(250)]).into()
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path(), "run").await.unwrap();

        assert_eq!(store.record(&[run(2), run(4)]).await.unwrap(), 2);
        assert_eq!(store.record(&[run(2), run(4)]).await.unwrap(), 0);
        assert_eq!(store.record(&[run(4), run(6)]).await.unwrap(), 1);

        let loaded = store.load().await.unwrap();
        let qubits: Vec<u32> = loaded.iter().map(ResultEntry::qubit_count).collect();
        assert_eq!(qubits, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_duplicates_within_one_batch_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path(), "run").await.unwrap();
        assert_eq!(store.record(&[run(2), run(2)]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_remembers_keys() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonlStore::open(dir.path(), "resume").await.unwrap();
            store.record(&[run(2)]).await.unwrap();
        }
        let store = JsonlStore::open(dir.path(), "resume").await.unwrap();
        assert_eq!(store.record(&[run(2), run(3)]).await.unwrap(), 1);
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_torn_tail_is_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.jsonl");
        let good = serde_json::to_string(&run(2)).unwrap();
        std::fs::write(&path, format!("{good}\n{{\"kind\":\"run\",\"qubit")).unwrap();

        let read = JsonlStore::read(&path).await.unwrap();
        assert_eq!(read.len(), 1);

        let store = JsonlStore::open_file(&path).await.unwrap();
        store.record(&[run(4)]).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_unterminated_complete_record_survives_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.jsonl");
        let good = serde_json::to_string(&run(2)).unwrap();
        std::fs::write(&path, &good).unwrap();

        let store = JsonlStore::open_file(&path).await.unwrap();
        assert_eq!(store.record(&[run(2), run(4)]).await.unwrap(), 1);

        let qubits: Vec<u32> = store
            .load()
            .await
            .unwrap()
            .iter()
            .map(ResultEntry::qubit_count)
            .collect();
        assert_eq!(qubits, vec![2, 4]);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        let reopened = JsonlStore::open_file(&path).await.unwrap();
        assert_eq!(reopened.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_middle_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let good = serde_json::to_string(&run(2)).unwrap();
        std::fs::write(&path, format!("not json\n{good}\n")).unwrap();

        let err = JsonlStore::read(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
    }

    #[tokio::test]
    async fn test_memory_store_keys_distinguish_stage() {
        let store = MemoryStore::new();
        let failure = |stage| {
            ResultEntry::from(SweepFailure {
                qubit_count: 3,
                stage,
                error_detail: "x".into(),
            })
        };
        let written = store
            .record(&[
                failure(FailureStage::Generate),
                failure(FailureStage::Normalize),
                failure(FailureStage::Generate),
            ])
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.location(), "memory");
    }
}
