//! SQLite-backed user and group storage

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::application::errors::StorageError;
use crate::domain::entities::{GroupSettings, UserRecord};
use crate::domain::traits::{GroupStore, UserStore};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_tables()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                usage_limit INTEGER NOT NULL DEFAULT 0 CHECK (usage_limit >= 0),
                premium INTEGER NOT NULL DEFAULT 0,
                registered INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        // Feature set stored as a JSON array
        conn.execute(
            "CREATE TABLE IF NOT EXISTS groups (
                id TEXT PRIMARY KEY,
                features TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        Ok(())
    }

    // User management
    pub fn upsert_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT INTO users (id, usage_limit, premium, registered) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                usage_limit = excluded.usage_limit,
                premium = excluded.premium,
                registered = excluded.registered",
            params![user.id, user.limit, user.premium, user.registered],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>, StorageError> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, usage_limit, premium, registered FROM users WHERE id = ?1",
                [id],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        limit: row.get(1)?,
                        premium: row.get(2)?,
                        registered: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Conditional update, so the limit cannot drop below zero
    pub fn deduct(&self, id: &str, cost: u32) -> Result<Option<u32>, StorageError> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE users SET usage_limit = usage_limit - ?2 WHERE id = ?1 AND usage_limit >= ?2",
            params![id, cost],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        let remaining: u32 = conn.query_row(
            "SELECT usage_limit FROM users WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(Some(remaining))
    }

    // Group management
    pub fn upsert_group(&self, group: &GroupSettings) -> Result<(), StorageError> {
        let features = serde_json::to_string(&group.features)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO groups (id, features) VALUES (?1, ?2)",
            params![group.id, features],
        )?;
        Ok(())
    }

    pub fn get_group(&self, id: &str) -> Result<Option<GroupSettings>, StorageError> {
        let row: Option<(String, String)> = self
            .conn()
            .query_row(
                "SELECT id, features FROM groups WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, features)) => {
                let features: BTreeSet<String> = serde_json::from_str(&features)?;
                Ok(Some(GroupSettings { id, features }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, StorageError> {
        self.get_user(id)
    }

    async fn deduct_limit(&self, id: &str, cost: u32) -> Result<Option<u32>, StorageError> {
        self.deduct(id, cost)
    }
}

#[async_trait]
impl GroupStore for Database {
    async fn find_group(&self, id: &str) -> Result<Option<GroupSettings>, StorageError> {
        self.get_group(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_round_trip_and_deduct() {
        let db = Database::in_memory().unwrap();
        db.upsert_user(&UserRecord::new("628", 2).premium()).unwrap();

        let user = db.get_user("628").unwrap().unwrap();
        assert_eq!(user.limit, 2);
        assert!(user.premium);
        assert!(user.registered);

        assert_eq!(db.deduct("628", 2).unwrap(), Some(0));
        assert_eq!(db.deduct("628", 1).unwrap(), None);
        assert_eq!(db.get_user("628").unwrap().unwrap().limit, 0);
        assert_eq!(db.deduct("missing", 1).unwrap(), None);
    }

    #[test]
    fn test_group_features() {
        let db = Database::in_memory().unwrap();
        db.upsert_group(&GroupSettings::new("g@g.us").with_feature("welcome").with_feature("left"))
            .unwrap();
        let group = db.get_group("g@g.us").unwrap().unwrap();
        assert!(group.has_feature("welcome"));
        assert!(group.has_feature("left"));
        assert!(db.get_group("other").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_traits() {
        let db = Database::in_memory().unwrap();
        db.upsert_user(&UserRecord::new("u", 5)).unwrap();
        assert_eq!(db.deduct_limit("u", 3).await.unwrap(), Some(2));
        assert!(!db.is_premium("u").await.unwrap());
        assert!(db.find_group("g").await.unwrap().is_none());
    }
}
