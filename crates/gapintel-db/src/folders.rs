//! Database operations for `folders`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub const DEFAULT_FOLDER_COLOR: &str = "#6366f1";
pub const DEFAULT_FOLDER_ICON: &str = "folder";

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct FolderRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFolder<'a> {
    pub name: &'a str,
    pub color: Option<&'a str>,
    pub icon: Option<&'a str>,
}

/// Creates a folder for `user_id`.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the user already has a folder with this
/// name, or [`DbError::Sqlx`] if the insert fails.
pub async fn create_folder(
    pool: &PgPool,
    user_id: &str,
    folder: &NewFolder<'_>,
) -> Result<FolderRow, DbError> {
    let row = sqlx::query_as::<_, FolderRow>(
        "INSERT INTO folders (id, user_id, name, color, icon) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, user_id, name, color, icon, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(folder.name)
    .bind(folder.color.unwrap_or(DEFAULT_FOLDER_COLOR))
    .bind(folder.icon.unwrap_or(DEFAULT_FOLDER_ICON))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a user's folders in name order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_folders(pool: &PgPool, user_id: &str) -> Result<Vec<FolderRow>, DbError> {
    let rows = sqlx::query_as::<_, FolderRow>(
        "SELECT id, user_id, name, color, icon, created_at \
         FROM folders WHERE user_id = $1 \
         ORDER BY name ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes a folder. Reports inside it become unfiled via `ON DELETE SET NULL`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the folder does not exist or belongs to
/// another user, or [`DbError::Sqlx`] if the statement fails.
pub async fn delete_folder(pool: &PgPool, user_id: &str, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
