//! Durable snapshot of the library summary list.
//!
//! A single named slot in a local SQLite database holds the last known
//! first-page-anchored snapshot as JSON, alongside a separate epoch-millis
//! marker so validity can be checked without deserializing the payload.
//! Concurrent processes race on the slot last-write-wins; there is no
//! locking beyond the connection mutex.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::api::types::{PageInfo, StorySummary};

/// Storage key for the serialized snapshot entry.
pub const SUMMARY_CACHE_KEY: &str = "specgen-stories-summary-cache";
/// Storage key for the duplicated timestamp marker.
pub const CACHE_TIMESTAMP_KEY: &str = "specgen-stories-cache-timestamp";

/// How long a snapshot stays valid for cache-first mounting.
const VALIDITY_WINDOW_MS: i64 = 30 * 60 * 1000;

/// Persisted library snapshot. Whole-entry replace only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
  pub data: Vec<StorySummary>,
  pub pagination: PageInfo,
  /// Epoch millis at save time.
  pub timestamp: i64,
}

impl SnapshotEntry {
  pub fn new(data: Vec<StorySummary>, pagination: PageInfo) -> Self {
    Self {
      data,
      pagination,
      timestamp: Utc::now().timestamp_millis(),
    }
  }

  /// True while the snapshot is inside the validity window.
  pub fn is_valid(&self) -> bool {
    Utc::now().timestamp_millis() - self.timestamp < VALIDITY_WINDOW_MS
  }

  /// Snapshot age in whole minutes, for the stale-data advisory.
  pub fn age_minutes(&self) -> i64 {
    (Utc::now().timestamp_millis() - self.timestamp).max(0) / 60_000
  }
}

/// SQLite-backed store for the summary snapshot.
pub struct SnapshotStore {
  conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
"#;

impl SnapshotStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// In-memory store, used by tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("sg9s").join("cache.db"))
  }

  /// Read the snapshot slot.
  ///
  /// Never fails: storage errors and corrupted payloads both read as
  /// absent, so a bad cache can only ever cost a network fetch.
  pub fn load(&self) -> Option<SnapshotEntry> {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("snapshot store lock poisoned: {e}");
        return None;
      }
    };

    let blob: Vec<u8> = match conn.query_row(
      "SELECT value FROM kv_store WHERE key = ?",
      params![SUMMARY_CACHE_KEY],
      |row| row.get(0),
    ) {
      Ok(blob) => blob,
      Err(rusqlite::Error::QueryReturnedNoRows) => return None,
      Err(e) => {
        warn!("failed to read snapshot: {e}");
        return None;
      }
    };

    match serde_json::from_slice(&blob) {
      Ok(entry) => Some(entry),
      Err(e) => {
        // Corrupted payload is indistinguishable from no cache
        debug!("discarding malformed snapshot payload: {e}");
        None
      }
    }
  }

  /// Write the snapshot slot and its timestamp marker, replacing any
  /// previous value.
  pub fn save(&self, entry: &SnapshotEntry) -> Result<()> {
    let blob = serde_json::to_vec(entry).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))?;

    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let tx_result: rusqlite::Result<()> = (|| {
      conn.execute("BEGIN TRANSACTION", [])?;
      conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
        params![SUMMARY_CACHE_KEY, blob],
      )?;
      conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
        params![CACHE_TIMESTAMP_KEY, entry.timestamp.to_string().into_bytes()],
      )?;
      conn.execute("COMMIT", [])?;
      Ok(())
    })();

    if tx_result.is_err() {
      let _ = conn.execute("ROLLBACK", []);
    }
    tx_result.map_err(|e| eyre!("Failed to write snapshot: {}", e))
  }

  /// Cheap validity probe: checks the timestamp marker without
  /// deserializing the snapshot payload.
  pub fn marker_is_valid(&self) -> bool {
    self
      .last_saved_at()
      .is_some_and(|ts| Utc::now().timestamp_millis() - ts < VALIDITY_WINDOW_MS)
  }

  /// Read the timestamp marker without touching the payload.
  pub fn last_saved_at(&self) -> Option<i64> {
    let conn = self.conn.lock().ok()?;
    let blob: Vec<u8> = conn
      .query_row(
        "SELECT value FROM kv_store WHERE key = ?",
        params![CACHE_TIMESTAMP_KEY],
        |row| row.get(0),
      )
      .ok()?;

    String::from_utf8(blob).ok()?.parse().ok()
  }
}
