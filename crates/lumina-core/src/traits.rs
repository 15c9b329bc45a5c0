//! Repository traits implemented by the storage layer.
//!
//! The engine crates depend on these traits rather than on a concrete store,
//! so the executor and manual service are testable against in-memory fakes
//! while `lumina-db` provides the PostgreSQL implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Media, PairWithMedia};
use crate::Result;

/// Read/write access to media records.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// All media eligible for grouping: non-null visual hash and not
    /// soft-deleted. Ordered by id so grouping input is stable.
    async fn list_hashed(&self) -> Result<Vec<Media>>;

    /// Fetch a single record. Unknown ids are `Error::MediaNotFound`.
    async fn get(&self, id: Uuid) -> Result<Media>;

    /// Soft-delete a record. Marking an already-deleted record succeeds;
    /// unknown ids are `Error::MediaNotFound`.
    async fn set_deleted(&self, id: Uuid) -> Result<()>;
}

/// Read/write access to duplicate-pair relationships.
#[async_trait]
pub trait DuplicatePairRepository: Send + Sync {
    /// All pending pairs joined with both sides' media records, ordered by
    /// `(media_id, duplicate_id)` so batch processing is deterministic.
    async fn list_with_media(&self) -> Result<Vec<PairWithMedia>>;

    /// Remove the relationship in both orientations. Retiring an
    /// already-retired pair succeeds.
    async fn retire(&self, media_id: Uuid, duplicate_id: Uuid) -> Result<()>;

    /// Number of pending pairs.
    async fn count(&self) -> Result<i64>;
}
