use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::warn;

use crate::config::{Config, HistoryBackend};

pub const DEFAULT_MAX_HISTORY: usize = 1000;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("history backend unavailable: {0}")]
    Unavailable(String),
}

/// Where accepted queries are loaded from and saved to.
pub trait HistoryPersistence: Send {
    fn load(&self) -> Result<Vec<String>, HistoryError>;
    fn save(&self, entries: &[String]) -> Result<(), HistoryError>;
}

/// Most-recent-first log of accepted queries, deduplicated and capped.
pub struct HistoryStore {
    entries: Vec<String>,
    max_entries: usize,
    persistence: Box<dyn HistoryPersistence>,
}

impl HistoryStore {
    /// Loads persisted entries. A failed load starts from an empty history.
    pub fn open(persistence: Box<dyn HistoryPersistence>, max_entries: usize) -> Self {
        let loaded = match persistence.load() {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "history load failed; starting empty");
                Vec::new()
            }
        };

        Self {
            entries: normalize_loaded(loaded, max_entries),
            max_entries,
            persistence,
        }
    }

    pub fn add_search(&mut self, query: &str) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return;
        }

        self.entries.retain(|entry| entry != trimmed);
        self.entries.insert(0, trimmed.to_string());
        self.entries.truncate(self.max_entries);

        if let Err(error) = self.persistence.save(&self.entries) {
            warn!(%error, "history save failed; keeping in-memory entries");
        }
    }

    pub fn recent_searches(&self, limit: usize) -> Vec<String> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// First entry, in recency order, that starts with `query` ignoring case.
    pub fn autocomplete(&self, query: &str) -> Option<String> {
        if query.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.to_lowercase().starts_with(&needle))
            .cloned()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

fn normalize_loaded(loaded: Vec<String>, max_entries: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(loaded.len().min(max_entries));
    for entry in loaded {
        if out.len() >= max_entries {
            break;
        }
        let trimmed = entry.trim();
        if trimmed.is_empty() || out.iter().any(|kept| kept == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// JSON array of strings on disk.
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryPersistence for JsonHistoryFile {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string(entries)?;
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }
}

/// SQLite table of queries ordered by position, front first.
pub struct SqliteHistory {
    db: Mutex<Connection>,
}

impl SqliteHistory {
    pub fn open_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn open_file(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    fn with_connection(db: Connection) -> Result<Self, HistoryError> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS search_history (position INTEGER PRIMARY KEY, query TEXT NOT NULL)",
            [],
        )?;
        Ok(Self { db: Mutex::new(db) })
    }
}

impl HistoryPersistence for SqliteHistory {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        let db = self.db.lock();
        let mut stmt = db.prepare("SELECT query FROM search_history ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryError> {
        let mut db = self.db.lock();
        let tx = db.transaction()?;
        tx.execute("DELETE FROM search_history", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO search_history (position, query) VALUES (?1, ?2)")?;
            for (position, query) in entries.iter().enumerate() {
                stmt.execute(params![position as i64, query])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Shared in-process buffer. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    entries: Arc<Mutex<Vec<String>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl HistoryPersistence for InMemoryHistory {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryError> {
        *self.entries.lock() = entries.to_vec();
        Ok(())
    }
}

pub fn open_persistence(cfg: &Config) -> Result<Box<dyn HistoryPersistence>, HistoryError> {
    Ok(match cfg.history_backend {
        HistoryBackend::Json => Box::new(JsonHistoryFile::new(&cfg.history_path)),
        HistoryBackend::Sqlite => Box::new(SqliteHistory::open_file(&cfg.history_path)?),
        HistoryBackend::Memory => Box::new(InMemoryHistory::new()),
    })
}
