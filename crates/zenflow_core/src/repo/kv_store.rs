//! Key-value store contract with SQLite and in-memory implementations.
//!
//! # Invariants
//! - `save` writes every entry of a call in one transaction.
//! - Decode failures surface as errors instead of silently loading defaults.

use crate::db::DbError;
use log::error;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid persisted value under `{key}`: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage is not ready: {0}")]
    NotReady(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Every key the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    Members,
    Classes,
    Records,
    Templates,
    RemoteUrl,
    SharedSecret,
    Autosave,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        Self::Members,
        Self::Classes,
        Self::Records,
        Self::Templates,
        Self::RemoteUrl,
        Self::SharedSecret,
        Self::Autosave,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Members => "zenflow_members",
            Self::Classes => "zenflow_classes",
            Self::Records => "zenflow_records",
            Self::Templates => "zenflow_class_templates",
            Self::RemoteUrl => "zenflow_gas_url",
            Self::SharedSecret => "zenflow_gas_secret",
            Self::Autosave => "zenflow_autosave",
        }
    }
}

/// Durable string storage keyed by [`StoreKey`].
pub trait KeyValueStore {
    fn load_raw(&self, key: StoreKey) -> RepoResult<Option<String>>;
    /// Writes all entries atomically.
    fn save_raw(&self, entries: &[(StoreKey, String)]) -> RepoResult<()>;
    fn remove(&self, key: StoreKey) -> RepoResult<()>;
    fn clear(&self) -> RepoResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn load_raw(&self, key: StoreKey) -> RepoResult<Option<String>> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, entries: &[(StoreKey, String)]) -> RepoResult<()> {
        (**self).save_raw(entries)
    }

    fn remove(&self, key: StoreKey) -> RepoResult<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> RepoResult<()> {
        (**self).clear()
    }
}

/// Loads and decodes one key, falling back to `T::default()` when absent.
pub fn load_json<T, S>(store: &S, key: StoreKey) -> RepoResult<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.load_raw(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| {
            error!(
                "event=kv_load module=repo status=error key={} error_code=decode_failed",
                key.as_str()
            );
            RepoError::Decode {
                key: key.as_str(),
                source,
            }
        }),
        None => Ok(T::default()),
    }
}

/// Encodes one value into a `(key, json)` entry ready for [`KeyValueStore::save_raw`].
pub fn encode_json<T: Serialize + ?Sized>(key: StoreKey, value: &T) -> RepoResult<(StoreKey, String)> {
    let raw = serde_json::to_string(value).map_err(|source| RepoError::Encode {
        key: key.as_str(),
        source,
    })?;
    Ok((key, raw))
}

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `NotReady` when the `kv_entries` table is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotReady("kv_entries table missing; run migrations"));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn load_raw(&self, key: StoreKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, entries: &[(StoreKey, String)]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<StoreKey, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn load_raw(&self, key: StoreKey) -> RepoResult<Option<String>> {
        Ok(self.entries.borrow().get(&key).cloned())
    }

    fn save_raw(&self, entries: &[(StoreKey, String)]) -> RepoResult<()> {
        let mut stored = self.entries.borrow_mut();
        for (key, value) in entries {
            stored.insert(*key, value.clone());
        }
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> RepoResult<()> {
        self.entries.borrow_mut().remove(&key);
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
