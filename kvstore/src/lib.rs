use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

const TABLENAME: &str = "kvstore";
const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

#[derive(Error, Debug)]
pub enum KVStoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not (de)serialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// SQLite-backed store of JSON values keyed by string
pub struct KVDb(Connection);

impl KVDb {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        log::trace!("Opening KV store at {:?}", path.as_ref());
        // Create directory for DB if it doesn't already exist
        std::fs::create_dir_all(path.as_ref().parent().unwrap_or(Path::new("")))?;
        let connection = Connection::open(path)?;
        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                {KEY_FIELD} TEXT PRIMARY KEY NOT NULL,
                {VALUE_FIELD} BLOB NOT NULL
                )"
            ),
            [],
        )?;
        Ok(KVDb(connection))
    }

    fn select(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.0
            .query_row(
                &format!("SELECT {VALUE_FIELD} FROM '{TABLENAME}' WHERE {KEY_FIELD} = ?1"),
                [key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn upsert(&self, key: &str, value: &[u8]) -> Result<(), KVStoreError> {
        let mut stmt = self.0.prepare(&format!(
            "INSERT INTO '{TABLENAME}' ({KEY_FIELD}, {VALUE_FIELD}) values (?1, ?2)
            ON CONFLICT({KEY_FIELD}) DO UPDATE SET {VALUE_FIELD}=?2",
        ))?;
        let res = stmt.execute(params![key, value])?;
        log::trace!("Upserted {res} row(s) for key '{key}'");
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, KVStoreError> {
        self.select(key.as_ref())?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(Into::into)
    }

    pub fn set<V: Serialize>(&self, key: impl AsRef<str>, value: V) -> Result<(), KVStoreError> {
        self.upsert(key.as_ref(), &serde_json::to_vec(&value)?)
    }

    /// All entries whose key starts with `prefix`, ordered by key
    pub fn scan_prefix<T: DeserializeOwned>(
        &self,
        prefix: impl AsRef<str>,
    ) -> Result<Vec<(String, T)>, KVStoreError> {
        let mut stmt = self.0.prepare(&format!(
            "SELECT {KEY_FIELD}, {VALUE_FIELD} FROM '{TABLENAME}'
            WHERE substr({KEY_FIELD}, 1, length(?1)) = ?1 ORDER BY {KEY_FIELD}"
        ))?;
        let rows = stmt.query_map([prefix.as_ref()], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, Vec<u8>>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (key, raw) = row?;
            entries.push((key, serde_json::from_slice::<T>(&raw)?));
        }
        Ok(entries)
    }
}
