// src/services/users.rs
// User records in SQLite via rusqlite. Unrelated to the messaging flow.
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE
    );
";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get::<_, i64>(0)? as u64,
            username: row.get(1)?,
            email: row.get(2)?,
        })
    }
}

/// Fields accepted on create (both required) and update (each optional).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Thread-safe handle to the user database. Queries run on the blocking pool.
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("path", &self.path).finish()
    }
}

impl UserStore {
    /// Open (or create) the database at `path` and make sure the table exists.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let db_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> anyhow::Result<Connection> {
            let conn = Connection::open(&db_path)
                .with_context(|| format!("opening {}", db_path.display()))?;
            conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
            conn.execute_batch(SCHEMA).context("creating users table")?;
            Ok(conn)
        })
        .await??;
        tracing::info!(path = %path.display(), "user store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// A private database that lives as long as the store.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, username, email FROM users ORDER BY id")?;
            let users = stmt
                .query_map([], User::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }

    pub async fn get(&self, id: u64) -> Result<User, AppError> {
        self.with_conn(move |conn| find(conn, id)?.ok_or_else(|| not_found(id)))
            .await
    }

    pub async fn create(&self, input: UserInput) -> Result<User, AppError> {
        let (Some(username), Some(email)) = (non_empty(input.username), non_empty(input.email)) else {
            return Err(AppError::InvalidArgument(
                "Missing required fields: username, email".into(),
            ));
        };

        let user = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO users (username, email) VALUES (?1, ?2)",
                    params![username, email],
                )?;
                Ok(User {
                    id: conn.last_insert_rowid() as u64,
                    username,
                    email,
                })
            })
            .await?;
        tracing::info!(id = user.id, "user created");
        Ok(user)
    }

    pub async fn update(&self, id: u64, input: UserInput) -> Result<User, AppError> {
        self.with_conn(move |conn| {
            let mut user = find(conn, id)?.ok_or_else(|| not_found(id))?;
            if let Some(username) = non_empty(input.username) {
                user.username = username;
            }
            if let Some(email) = non_empty(input.email) {
                user.email = email;
            }
            conn.execute(
                "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
                params![user.username, user.email, id as i64],
            )?;
            Ok(user)
        })
        .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        self.with_conn(move |conn| {
            match conn.execute("DELETE FROM users WHERE id = ?1", params![id as i64])? {
                0 => Err(not_found(id)),
                _ => Ok(()),
            }
        })
        .await?;
        tracing::info!(id, "user deleted");
        Ok(())
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| AppError::Internal(format!("user store lock: {e}")))?;
            f(&guard)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

fn find(conn: &Connection, id: u64) -> Result<Option<User>, AppError> {
    Ok(conn
        .query_row(
            "SELECT id, username, email FROM users WHERE id = ?1",
            params![id as i64],
            User::from_row,
        )
        .optional()?)
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                // "UNIQUE constraint failed: users.email"
                let column = msg
                    .as_deref()
                    .and_then(|m| m.rsplit('.').next())
                    .unwrap_or("value");
                AppError::Conflict(format!("{column} already exists"))
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("user {id} not found"))
}
