//! Operator queries

use opcon_common::time::now_iso;
use sqlx::SqlitePool;

use crate::error::Result;

/// Insert a new operator and return its id
pub async fn insert_operator(db: &SqlitePool, name: &str, dni: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO operators (name, dni, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(dni)
        .bind(now_iso())
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn operator_exists(db: &SqlitePool, operator_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM operators WHERE id = ?)")
        .bind(operator_id)
        .fetch_one(db)
        .await?;
    Ok(exists)
}
