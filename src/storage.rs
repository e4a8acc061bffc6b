use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension, Result};

use crate::error::ClientError;

/// Durable key/value storage shared by everything that persists client state.
pub type Storage = Arc<Mutex<Connection>>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

pub fn open(path: impl AsRef<Path>) -> Result<Storage> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<Storage> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn lock(storage: &Storage) -> MutexGuard<'_, Connection> {
    storage.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn get_item(storage: &Storage, key: &str) -> Result<Option<String>, ClientError> {
    let conn = lock(storage);
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

/// Writes every pair or none of them.
pub fn set_items(storage: &Storage, items: &[(&str, &str)]) -> Result<(), ClientError> {
    let mut conn = lock(storage);
    let tx = conn.transaction()?;
    for (key, value) in items {
        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn set_item(storage: &Storage, key: &str, value: &str) -> Result<(), ClientError> {
    set_items(storage, &[(key, value)])
}

/// Removes every key in one transaction. Missing keys are ignored.
pub fn remove_items(storage: &Storage, keys: &[&str]) -> Result<(), ClientError> {
    let mut conn = lock(storage);
    let tx = conn.transaction()?;
    for key in keys {
        tx.execute("DELETE FROM kv WHERE key = ?1", [key])?;
    }
    tx.commit()?;
    Ok(())
}

pub fn remove_item(storage: &Storage, key: &str) -> Result<(), ClientError> {
    remove_items(storage, &[key])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = open_in_memory().unwrap();
        assert_eq!(get_item(&storage, "a").unwrap(), None);

        set_item(&storage, "a", "1").unwrap();
        assert_eq!(get_item(&storage, "a").unwrap().as_deref(), Some("1"));

        set_item(&storage, "a", "2").unwrap();
        assert_eq!(get_item(&storage, "a").unwrap().as_deref(), Some("2"));

        remove_item(&storage, "a").unwrap();
        assert_eq!(get_item(&storage, "a").unwrap(), None);
    }

    #[test]
    fn set_items_writes_all_pairs() {
        let storage = open_in_memory().unwrap();
        set_items(&storage, &[("token", "abc"), ("user", "{}")]).unwrap();
        assert_eq!(get_item(&storage, "token").unwrap().as_deref(), Some("abc"));
        assert_eq!(get_item(&storage, "user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn removing_missing_keys_is_not_an_error() {
        let storage = open_in_memory().unwrap();
        remove_items(&storage, &["nope", "also-nope"]).unwrap();
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");

        let storage = open(&path).unwrap();
        set_item(&storage, "token", "abc").unwrap();
        drop(storage);

        let storage = open(&path).unwrap();
        assert_eq!(get_item(&storage, "token").unwrap().as_deref(), Some("abc"));
    }
}
