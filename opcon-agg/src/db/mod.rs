//! Database access layer for opcon-agg
//!
//! SQLite holds four tables: operators, the media catalog, playback sessions
//! and the raw playback events recorded against them. The schema is created
//! on startup; nothing is ever migrated in place.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub mod aggregates;
pub mod demo;
pub mod media;
pub mod operators;
pub mod sessions;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS operators (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    dni TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS media_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    kind TEXT NOT NULL CHECK(kind IN ('audio', 'video')),
    source_url TEXT NOT NULL,
    duration_seconds INTEGER DEFAULT 0,
    genre TEXT DEFAULT 'General',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS playback_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operator_id INTEGER NOT NULL,
    media_item_id INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    last_position REAL DEFAULT 0,
    completed INTEGER DEFAULT 0,
    FOREIGN KEY(operator_id) REFERENCES operators(id),
    FOREIGN KEY(media_item_id) REFERENCES media_items(id)
);

CREATE TABLE IF NOT EXISTS playback_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    event_type TEXT NOT NULL,
    position REAL DEFAULT 0,
    payload_json TEXT DEFAULT '{}',
    created_at TEXT NOT NULL,
    FOREIGN KEY(session_id) REFERENCES playback_sessions(id)
);

CREATE INDEX IF NOT EXISTS idx_sessions_operator ON playback_sessions(operator_id);
CREATE INDEX IF NOT EXISTS idx_events_session ON playback_events(session_id);
"#;

/// Open (creating if needed) the database file and prepare the schema
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
        .context("Invalid database path")?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    init(&pool).await?;
    Ok(pool)
}

/// Private in-memory database, used by tests and throwaway runs
///
/// A single connection keeps every query on the same in-memory database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    init(&pool).await?;
    Ok(pool)
}

/// Create tables and seed the sample catalog when it is empty
pub async fn init(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .context("Failed to create schema")?;

    let seeded = media::seed_samples(pool)
        .await
        .context("Failed to seed sample media")?;
    if seeded > 0 {
        info!("Seeded {} sample media items", seeded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_database_reopens_without_reseeding() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("media_control.sqlite3");

        let pool = connect(&db_path).await.unwrap();
        assert!(db_path.exists());
        pool.close().await;

        let pool = connect(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 4);
    }
}
