//! Duplicate-pair repository backed by PostgreSQL.
//!
//! A pair row is directed (`media_id`, `duplicate_id`) but the relationship
//! is symmetric, so retirement always covers both orientations. Pairs whose
//! media rows are gone disappear structurally: the join drops them and the
//! foreign keys cascade on hard deletes.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use lumina_core::{
    CaptureMetadata, DuplicatePair, DuplicatePairRepository, Error, Media, PairWithMedia, Result,
};

/// PostgreSQL implementation of [`DuplicatePairRepository`].
pub struct PgDuplicatePairRepository {
    pool: PgPool,
}

impl PgDuplicatePairRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a pair row. Used by the external matcher and by test seeding;
    /// re-matching the same pair refreshes its distance and score.
    pub async fn insert(&self, pair: &DuplicatePair) -> Result<()> {
        sqlx::query(
            "INSERT INTO duplicate_pair \
             (media_id, duplicate_id, hamming_distance, similarity_score, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (media_id, duplicate_id) DO UPDATE \
             SET hamming_distance = EXCLUDED.hamming_distance, \
                 similarity_score = EXCLUDED.similarity_score",
        )
        .bind(pair.media_id)
        .bind(pair.duplicate_id)
        .bind(pair.hamming_distance)
        .bind(pair.similarity_score)
        .bind(pair.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Whether a pair exists in either orientation.
    pub async fn exists(&self, media_id: Uuid, duplicate_id: Uuid) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS( \
                 SELECT 1 FROM duplicate_pair \
                 WHERE (media_id = $1 AND duplicate_id = $2) \
                    OR (media_id = $2 AND duplicate_id = $1)) AS present",
        )
        .bind(media_id)
        .bind(duplicate_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("present"))
    }
}

fn parse_side(row: &PgRow, id: Uuid, prefix: &str) -> Media {
    let col = |name: &str| format!("{prefix}_{name}");
    Media {
        id,
        path: row.get(col("path").as_str()),
        size_bytes: row.get(col("size_bytes").as_str()),
        visual_hash: row.get(col("visual_hash").as_str()),
        capture: CaptureMetadata {
            timestamp: row.get(col("capture_timestamp").as_str()),
            width: row
                .get::<Option<i32>, _>(col("width").as_str())
                .map(|w| w as u32),
            height: row
                .get::<Option<i32>, _>(col("height").as_str())
                .map(|h| h as u32),
        },
        is_deleted: row.get(col("is_deleted").as_str()),
        is_hidden: row.get(col("is_hidden").as_str()),
        created_at: row.get(col("created_at").as_str()),
        updated_at: row.get(col("updated_at").as_str()),
    }
}

fn parse_pair_row(row: &PgRow) -> PairWithMedia {
    let media_id: Uuid = row.get("media_id");
    let duplicate_id: Uuid = row.get("duplicate_id");
    PairWithMedia {
        pair: DuplicatePair {
            media_id,
            duplicate_id,
            hamming_distance: row.get("hamming_distance"),
            similarity_score: row.get("similarity_score"),
            created_at: row.get("created_at"),
        },
        media: parse_side(row, media_id, "m"),
        duplicate: parse_side(row, duplicate_id, "d"),
    }
}

#[async_trait]
impl DuplicatePairRepository for PgDuplicatePairRepository {
    async fn list_with_media(&self) -> Result<Vec<PairWithMedia>> {
        let rows = sqlx::query(
            "SELECT p.media_id, p.duplicate_id, p.hamming_distance, p.similarity_score, \
                    p.created_at, \
                    m.path AS m_path, m.size_bytes AS m_size_bytes, \
                    m.visual_hash AS m_visual_hash, m.width AS m_width, \
                    m.height AS m_height, m.capture_timestamp AS m_capture_timestamp, \
                    m.is_deleted AS m_is_deleted, m.is_hidden AS m_is_hidden, \
                    m.created_at AS m_created_at, m.updated_at AS m_updated_at, \
                    d.path AS d_path, d.size_bytes AS d_size_bytes, \
                    d.visual_hash AS d_visual_hash, d.width AS d_width, \
                    d.height AS d_height, d.capture_timestamp AS d_capture_timestamp, \
                    d.is_deleted AS d_is_deleted, d.is_hidden AS d_is_hidden, \
                    d.created_at AS d_created_at, d.updated_at AS d_updated_at \
             FROM duplicate_pair p \
             JOIN media m ON m.id = p.media_id \
             JOIN media d ON d.id = p.duplicate_id \
             ORDER BY p.media_id, p.duplicate_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(parse_pair_row).collect())
    }

    async fn retire(&self, media_id: Uuid, duplicate_id: Uuid) -> Result<()> {
        // Zero rows affected means the pair was already retired; that is
        // success.
        sqlx::query(
            "DELETE FROM duplicate_pair \
             WHERE (media_id = $1 AND duplicate_id = $2) \
                OR (media_id = $2 AND duplicate_id = $1)",
        )
        .bind(media_id)
        .bind(duplicate_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM duplicate_pair")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("n"))
    }
}
