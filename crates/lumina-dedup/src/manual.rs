//! Operator-driven resolution actions.
//!
//! Review surfaces let an operator dismiss a pairing as a false positive or
//! delete a specific record directly, independent of the automatic rule set.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use lumina_core::logging::SUBSYSTEM_DEDUP;
use lumina_core::{DuplicatePairRepository, Error, MediaRepository, Result};

pub struct ManualResolution {
    media: Arc<dyn MediaRepository>,
    pairs: Arc<dyn DuplicatePairRepository>,
}

impl ManualResolution {
    pub fn new(media: Arc<dyn MediaRepository>, pairs: Arc<dyn DuplicatePairRepository>) -> Self {
        Self { media, pairs }
    }

    /// Dismiss a pair as not-a-duplicate. Both records stay; only the
    /// relationship goes, whichever orientation it was stored in.
    /// Dismissing a pair that no longer exists is a no-op.
    pub async fn dismiss(&self, media_id: Uuid, duplicate_id: Uuid) -> Result<()> {
        if media_id == duplicate_id {
            return Err(Error::InvalidInput(
                "cannot dismiss a media record paired with itself".to_string(),
            ));
        }
        self.pairs.retire(media_id, duplicate_id).await?;
        info!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "manual",
            op = "dismiss",
            %media_id,
            %duplicate_id,
            "Dismissed duplicate pair"
        );
        Ok(())
    }

    /// Soft-delete one record the operator picked out of a group. Stored
    /// pairs referencing it stay pending; the next resolver run retires them
    /// as stale.
    pub async fn mark_deleted(&self, id: Uuid) -> Result<()> {
        self.media.set_deleted(id).await?;
        info!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "manual",
            op = "mark_deleted",
            media_id = %id,
            "Marked media deleted"
        );
        Ok(())
    }
}
