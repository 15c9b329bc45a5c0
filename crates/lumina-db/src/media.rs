//! Media repository backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use lumina_core::{CaptureMetadata, Error, Media, MediaRepository, Result};

const MEDIA_COLUMNS: &str = "id, path, size_bytes, visual_hash, width, height, \
                             capture_timestamp, is_deleted, is_hidden, created_at, updated_at";

/// PostgreSQL implementation of [`MediaRepository`].
pub struct PgMediaRepository {
    pool: PgPool,
}

impl PgMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a full media row. Used by ingestion and by test seeding; the
    /// resolution engine itself never creates media.
    pub async fn insert(&self, media: &Media) -> Result<()> {
        sqlx::query(
            "INSERT INTO media \
             (id, path, size_bytes, visual_hash, width, height, capture_timestamp, \
              is_deleted, is_hidden, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(media.id)
        .bind(&media.path)
        .bind(media.size_bytes)
        .bind(&media.visual_hash)
        .bind(media.capture.width.map(|w| w as i32))
        .bind(media.capture.height.map(|h| h as i32))
        .bind(media.capture.timestamp)
        .bind(media.is_deleted)
        .bind(media.is_hidden)
        .bind(media.created_at)
        .bind(media.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

fn parse_media_row(row: &PgRow) -> Media {
    Media {
        id: row.get("id"),
        path: row.get("path"),
        size_bytes: row.get("size_bytes"),
        visual_hash: row.get("visual_hash"),
        capture: CaptureMetadata {
            timestamp: row.get("capture_timestamp"),
            width: row.get::<Option<i32>, _>("width").map(|w| w as u32),
            height: row.get::<Option<i32>, _>("height").map(|h| h as u32),
        },
        is_deleted: row.get("is_deleted"),
        is_hidden: row.get("is_hidden"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    async fn list_hashed(&self) -> Result<Vec<Media>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media \
             WHERE visual_hash IS NOT NULL AND is_deleted = FALSE \
             ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(parse_media_row).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Media> {
        let row = sqlx::query(&format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref()
            .map(parse_media_row)
            .ok_or(Error::MediaNotFound(id))
    }

    async fn set_deleted(&self, id: Uuid) -> Result<()> {
        let result =
            sqlx::query("UPDATE media SET is_deleted = TRUE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::MediaNotFound(id));
        }
        Ok(())
    }
}
