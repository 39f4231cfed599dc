//! Media catalog queries

use opcon_common::models::{MediaItem, MediaKind, DEFAULT_GENRE};
use opcon_common::time::now_iso;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{ApiError, Result};

/// Catalog entry about to be inserted
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub title: String,
    pub kind: MediaKind,
    pub source_url: String,
    pub duration_seconds: i64,
    pub genre: String,
}

impl NewMedia {
    pub fn new(title: &str, kind: MediaKind, source_url: &str, duration_seconds: i64, genre: &str) -> Self {
        Self {
            title: title.to_string(),
            kind,
            source_url: source_url.to_string(),
            duration_seconds,
            genre: genre.to_string(),
        }
    }

    /// Read one row of a catalog export.
    ///
    /// `None` unless the row has a title, a known kind and a source url.
    pub fn from_export(row: &Value) -> Option<Self> {
        let title = export_text(row, "title");
        let source_url = export_text(row, "source_url");
        if title.is_empty() || source_url.is_empty() {
            return None;
        }
        let kind = export_text(row, "kind").parse::<MediaKind>().ok()?;

        let duration_seconds = match row.get("duration_seconds") {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .unwrap_or(0)
        .max(0);
        let genre = Some(export_text(row, "genre"))
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_GENRE);

        Some(Self::new(title, kind, source_url, duration_seconds, genre))
    }
}

fn export_text<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).map(str::trim).unwrap_or("")
}

/// Catalog seeded into an empty database
fn sample_catalog() -> Vec<NewMedia> {
    vec![
        NewMedia::new("Sample MP3 3s", MediaKind::Audio, "https://samplelib.com/lib/preview/mp3/sample-3s.mp3", 3, "Demo"),
        NewMedia::new("Sample MP3 6s", MediaKind::Audio, "https://samplelib.com/lib/preview/mp3/sample-6s.mp3", 6, "Demo"),
        NewMedia::new("Sample MP4 5s", MediaKind::Video, "https://samplelib.com/lib/preview/mp4/sample-5s.mp4", 5, "Demo"),
        NewMedia::new("Sample MP4 10s", MediaKind::Video, "https://samplelib.com/lib/preview/mp4/sample-10s.mp4", 10, "Demo"),
    ]
}

/// Seed the sample catalog if no media exists yet. Returns rows inserted.
pub async fn seed_samples(db: &SqlitePool) -> Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items")
        .fetch_one(db)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let samples = sample_catalog();
    for item in &samples {
        insert_media(db, item).await?;
    }
    Ok(samples.len())
}

pub async fn insert_media(db: &SqlitePool, item: &NewMedia) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO media_items (title, kind, source_url, duration_seconds, genre, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.title)
    .bind(item.kind.as_str())
    .bind(&item.source_url)
    .bind(item.duration_seconds)
    .bind(&item.genre)
    .bind(now_iso())
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Insert a batch of catalog entries in one transaction. Returns rows inserted.
pub async fn import_media(db: &SqlitePool, items: &[NewMedia]) -> Result<usize> {
    let mut tx = db.begin().await?;
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO media_items (title, kind, source_url, duration_seconds, genre, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.title)
        .bind(item.kind.as_str())
        .bind(&item.source_url)
        .bind(item.duration_seconds)
        .bind(&item.genre)
        .bind(now_iso())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(items.len())
}

/// Catalog listing, newest first, optionally filtered by kind
pub async fn list_media(db: &SqlitePool, kind: Option<MediaKind>) -> Result<Vec<MediaItem>> {
    let rows = match kind {
        Some(kind) => {
            sqlx::query(
                r#"
                SELECT id, title, kind, source_url, duration_seconds, genre, created_at
                FROM media_items WHERE kind = ? ORDER BY id DESC
                "#,
            )
            .bind(kind.as_str())
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, title, kind, source_url, duration_seconds, genre, created_at
                FROM media_items ORDER BY id DESC
                "#,
            )
            .fetch_all(db)
            .await?
        }
    };

    rows.iter().map(media_from_row).collect()
}

pub async fn media_exists(db: &SqlitePool, media_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM media_items WHERE id = ?)")
        .bind(media_id)
        .fetch_one(db)
        .await?;
    Ok(exists)
}

/// All catalog ids, oldest first
pub async fn media_ids(db: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM media_items ORDER BY id")
        .fetch_all(db)
        .await?;
    Ok(ids)
}

fn media_from_row(row: &SqliteRow) -> Result<MediaItem> {
    let kind_text: String = row.get("kind");
    let kind = kind_text
        .parse::<MediaKind>()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(MediaItem {
        id: row.get("id"),
        title: row.get("title"),
        kind,
        genre: row
            .get::<Option<String>, _>("genre")
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GENRE.to_string()),
        duration_seconds: row.get::<Option<i64>, _>("duration_seconds").unwrap_or(0),
        source_url: row.get("source_url"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_row_defaults() {
        let item = NewMedia::from_export(&json!({
            "title": " Clip ",
            "kind": "VIDEO",
            "source_url": "https://example.com/clip.mp4",
            "duration_seconds": 12.7,
        }))
        .unwrap();
        assert_eq!(item.title, "Clip");
        assert_eq!(item.kind, MediaKind::Video);
        assert_eq!(item.duration_seconds, 12);
        assert_eq!(item.genre, DEFAULT_GENRE);
    }

    #[test]
    fn test_export_row_rejections() {
        assert!(NewMedia::from_export(&json!({"title": "x", "kind": "podcast", "source_url": "u"})).is_none());
        assert!(NewMedia::from_export(&json!({"title": "", "kind": "audio", "source_url": "u"})).is_none());
        assert!(NewMedia::from_export(&json!({"title": "x", "kind": "audio"})).is_none());
        assert!(NewMedia::from_export(&json!("not a row")).is_none());
    }
}
