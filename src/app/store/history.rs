//! Visit history persistence
//!
//! SQLite-backed store of repositories the user has viewed, keyed by
//! `full_name` with replace-on-conflict semantics so revisiting a repository
//! updates the stored record in place. Reads are push-based: the store keeps
//! a broadcast cell holding the current full list and refreshes it after
//! every mutation, so all live observers see a write immediately.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::app::cell::StateCell;
use crate::app::models::{Repo, RepoOwner};
use crate::errors::StoreResult;

/// Store of visited repositories backed by one SQLite database
///
/// The connection is serialized behind a mutex; SQLite itself serializes
/// writers, the mutex keeps the `rusqlite` handle single-threaded. All
/// methods block and must not run on the dispatcher thread.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    snapshot: StateCell<Vec<Repo>>,
}

impl HistoryStore {
    /// Open (creating if needed) the history database at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory history database, used by tests
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS repositories (
                full_name        TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                owner_login      TEXT NOT NULL,
                owner_avatar_url TEXT NOT NULL,
                description      TEXT,
                language         TEXT,
                updated_at       TEXT NOT NULL,
                stars            INTEGER NOT NULL,
                visited_at       INTEGER NOT NULL DEFAULT (unixepoch())
            )",
            [],
        )?;

        let store = Self {
            conn: Mutex::new(conn),
            snapshot: StateCell::new(),
        };
        store.refresh()?;
        Ok(store)
    }

    /// Insert or replace one repository record.
    ///
    /// Idempotent by key: upserting the same `full_name` twice leaves exactly
    /// one record reflecting the last write.
    pub fn upsert(&self, repo: &Repo) -> StoreResult<()> {
        {
            let conn = self.conn.lock().expect("history lock poisoned");
            conn.execute(
                "INSERT OR REPLACE INTO repositories
                    (full_name, name, owner_login, owner_avatar_url,
                     description, language, updated_at, stars, visited_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, unixepoch())",
                params![
                    repo.full_name,
                    repo.name,
                    repo.owner.login,
                    repo.owner.avatar_url,
                    repo.description,
                    repo.language,
                    repo.updated_at,
                    repo.stars,
                ],
            )?;
        }
        debug!(repo = %repo.full_name, "recorded repository visit");
        self.refresh()
    }

    /// Remove every record
    pub fn delete_all(&self) -> StoreResult<()> {
        {
            let conn = self.conn.lock().expect("history lock poisoned");
            conn.execute("DELETE FROM repositories", [])?;
        }
        debug!("cleared visit history");
        self.refresh()
    }

    /// Load the full history, most recently visited first
    pub fn load_all(&self) -> StoreResult<Vec<Repo>> {
        let conn = self.conn.lock().expect("history lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT full_name, name, owner_login, owner_avatar_url,
                    description, language, updated_at, stars
             FROM repositories
             ORDER BY visited_at DESC, full_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Repo {
                full_name: row.get(0)?,
                name: row.get(1)?,
                owner: RepoOwner {
                    login: row.get(2)?,
                    avatar_url: row.get(3)?,
                },
                description: row.get(4)?,
                language: row.get(5)?,
                updated_at: row.get(6)?,
                stars: row.get(7)?,
            })
        })?;
        let mut repos = Vec::new();
        for row in rows {
            repos.push(row?);
        }
        Ok(repos)
    }

    /// Broadcast cell holding the current full list.
    ///
    /// Seeded on open and refreshed after every mutation; subscribing yields
    /// the current list immediately.
    pub fn watch(&self) -> &StateCell<Vec<Repo>> {
        &self.snapshot
    }

    fn refresh(&self) -> StoreResult<()> {
        let repos = self.load_all()?;
        self.snapshot.push(repos);
        Ok(())
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}
