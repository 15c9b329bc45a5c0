//! Automatic resolution over pending duplicate pairs.
//!
//! The resolver walks every stored pair, asks the rule set which side to
//! delete, soft-deletes that side, and retires the pair. Each pair is
//! handled independently: a store failure on one pair is logged and counted
//! while the batch moves on. Re-running is safe, resolved pairs are gone and
//! already-deleted media trigger cleanup instead of rule evaluation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use lumina_core::logging::SUBSYSTEM_DEDUP;
use lumina_core::{
    DuplicatePairRepository, MediaRepository, PairDecision, PairWithMedia, ResolutionAction,
    ResolutionDecision, ResolutionSummary, Result,
};

use crate::rules::{self, Rule};

/// Batch executor applying the rule set to all pending pairs.
pub struct AutoResolver {
    media: Arc<dyn MediaRepository>,
    pairs: Arc<dyn DuplicatePairRepository>,
}

impl AutoResolver {
    pub fn new(media: Arc<dyn MediaRepository>, pairs: Arc<dyn DuplicatePairRepository>) -> Self {
        Self { media, pairs }
    }

    /// Evaluate every pending pair and apply the matched decisions.
    ///
    /// Fails only when the pending listing itself cannot be read. Per-pair
    /// write failures leave that pair for the next run and surface in
    /// `failed`.
    pub async fn run(&self) -> Result<ResolutionSummary> {
        let pending = match self.pairs.list_with_media().await {
            Ok(pending) => pending,
            Err(err) => {
                error!(
                    subsystem = SUBSYSTEM_DEDUP,
                    component = "resolver",
                    op = "run",
                    error = %err,
                    "Failed to list pending pairs, batch aborted"
                );
                return Err(err);
            }
        };

        info!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "resolver",
            op = "run",
            pending = pending.len(),
            rules = ?Rule::DEFAULT_ORDER.map(|r| r.name()),
            "Starting auto-resolution"
        );

        let mut summary = ResolutionSummary::default();
        for item in &pending {
            summary.processed += 1;
            self.resolve_pair(item, &mut summary).await;
        }

        info!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "resolver",
            op = "run",
            processed = summary.processed,
            deleted = summary.deleted,
            skipped = summary.skipped,
            failed = summary.failed,
            "Auto-resolution finished"
        );
        Ok(summary)
    }

    /// The decisions the next `run` would take, without writing anything.
    pub async fn preview(&self) -> Result<Vec<PairDecision>> {
        let pending = self.pairs.list_with_media().await?;
        Ok(pending
            .into_iter()
            .map(|item| {
                let decision = if item.media.is_deleted || item.duplicate.is_deleted {
                    ResolutionDecision::no_decision("references already-deleted media")
                } else {
                    rules::evaluate(&item.media, &item.duplicate)
                };
                PairDecision {
                    media_id: item.pair.media_id,
                    duplicate_id: item.pair.duplicate_id,
                    decision,
                }
            })
            .collect())
    }

    async fn resolve_pair(&self, item: &PairWithMedia, summary: &mut ResolutionSummary) {
        let media_id = item.pair.media_id;
        let duplicate_id = item.pair.duplicate_id;

        // A pair with an already-deleted side is stale bookkeeping from an
        // earlier partial run; retire it without touching media.
        if item.media.is_deleted || item.duplicate.is_deleted {
            match self.pairs.retire(media_id, duplicate_id).await {
                Ok(()) => summary.skipped += 1,
                Err(err) => {
                    warn!(
                        subsystem = SUBSYSTEM_DEDUP,
                        component = "resolver",
                        op = "retire",
                        %media_id,
                        %duplicate_id,
                        error = %err,
                        "Failed to retire stale pair"
                    );
                    summary.failed += 1;
                }
            }
            return;
        }

        let decision = rules::evaluate(&item.media, &item.duplicate);
        let victim_id = match decision.action {
            ResolutionAction::DeleteFirst => media_id,
            ResolutionAction::DeleteSecond => duplicate_id,
            ResolutionAction::NoDecision => {
                debug!(
                    subsystem = SUBSYSTEM_DEDUP,
                    component = "resolver",
                    op = "evaluate",
                    %media_id,
                    %duplicate_id,
                    reason = %decision.reason,
                    "Pair left pending"
                );
                summary.skipped += 1;
                return;
            }
        };

        if let Err(err) = self.media.set_deleted(victim_id).await {
            warn!(
                subsystem = SUBSYSTEM_DEDUP,
                component = "resolver",
                op = "set_deleted",
                %victim_id,
                error = %err,
                "Failed to mark media deleted, pair kept for retry"
            );
            summary.failed += 1;
            return;
        }
        summary.deleted += 1;
        debug!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "resolver",
            op = "set_deleted",
            %victim_id,
            reason = %decision.reason,
            confidence = decision.confidence,
            "Deleted duplicate media"
        );

        if let Err(err) = self.pairs.retire(media_id, duplicate_id).await {
            // The deletion landed; the leftover pair is retired as stale on
            // the next run.
            warn!(
                subsystem = SUBSYSTEM_DEDUP,
                component = "resolver",
                op = "retire",
                %media_id,
                %duplicate_id,
                error = %err,
                "Failed to retire resolved pair"
            );
            summary.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_media, MemoryStore};
    use lumina_core::Error;
    use uuid::Uuid;

    fn resolver(store: &Arc<MemoryStore>) -> AutoResolver {
        AutoResolver::new(store.clone(), store.clone())
    }

    fn preview_and_raw(store: &MemoryStore) -> (Uuid, Uuid) {
        let preview = sample_media(1, "photos/IMG_0001.JPG", 2_000_000);
        let raw = sample_media(2, "photos/IMG_0001.NEF", 28_000_000);
        let ids = (preview.id, raw.id);
        store.add_media(preview);
        store.add_media(raw);
        store.add_pair(ids.0, ids.1, 3);
        ids
    }

    #[tokio::test]
    async fn test_run_deletes_matched_side_and_retires_pair() {
        let store = Arc::new(MemoryStore::new());
        let (preview_id, raw_id) = preview_and_raw(&store);

        let summary = resolver(&store).run().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 0);
        assert!(store.media_snapshot(preview_id).unwrap().is_deleted);
        assert!(!store.media_snapshot(raw_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 0);
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        preview_and_raw(&store);
        let resolver = resolver(&store);

        resolver.run().await.unwrap();
        let second = resolver.run().await.unwrap();

        assert_eq!(second, ResolutionSummary::default());
        assert_eq!(store.pair_count(), 0);
    }

    #[tokio::test]
    async fn test_unmatched_pair_is_left_pending() {
        let store = Arc::new(MemoryStore::new());
        let a = sample_media(1, "a/one.jpg", 2_000_000);
        let b = sample_media(2, "b/two.png", 3_000_000);
        store.add_pair(a.id, b.id, 4);
        store.add_media(a);
        store.add_media(b);

        let summary = resolver(&store).run().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.deleted, 0);
        assert_eq!(store.pair_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_pair_with_deleted_side_is_retired_without_deletion() {
        let store = Arc::new(MemoryStore::new());
        let preview = sample_media(1, "photos/IMG_0001.JPG", 2_000_000);
        let mut raw = sample_media(2, "photos/IMG_0001.NEF", 28_000_000);
        raw.is_deleted = true;
        store.add_pair(preview.id, raw.id, 3);
        let preview_id = preview.id;
        store.add_media(preview);
        store.add_media(raw);

        let summary = resolver(&store).run().await.unwrap();

        // The rule would delete the preview, but the stale pair is only
        // cleaned up.
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.deleted, 0);
        assert!(!store.media_snapshot(preview_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_pair_for_retry() {
        let store = Arc::new(MemoryStore::new());
        let (preview_id, _) = preview_and_raw(&store);
        store.fail_delete_of(preview_id);

        let summary = resolver(&store).run().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.deleted, 0);
        assert_eq!(summary.failed, 1);
        assert!(!store.media_snapshot(preview_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 1);
    }

    #[tokio::test]
    async fn test_retire_failure_after_delete_counts_both() {
        let store = Arc::new(MemoryStore::new());
        let (preview_id, _) = preview_and_raw(&store);
        store.fail_retires();

        let summary = resolver(&store).run().await.unwrap();

        // The deletion landed even though the pair could not be retired.
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failed, 1);
        assert!(store.media_snapshot(preview_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_continues_past_per_pair_failures() {
        let store = Arc::new(MemoryStore::new());
        let broken = sample_media(1, "a/IMG_1.JPG", 2_000_000);
        let broken_raw = sample_media(2, "a/IMG_1.NEF", 28_000_000);
        let fine = sample_media(3, "b/IMG_2.JPG", 2_000_000);
        let fine_raw = sample_media(4, "b/IMG_2.NEF", 28_000_000);
        store.add_pair(broken.id, broken_raw.id, 2);
        store.add_pair(fine.id, fine_raw.id, 2);
        store.fail_delete_of(broken.id);
        let fine_id = fine.id;
        for m in [broken, broken_raw, fine, fine_raw] {
            store.add_media(m);
        }

        let summary = resolver(&store).run().await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failed, 1);
        assert!(store.media_snapshot(fine_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 1);
    }

    #[tokio::test]
    async fn test_listing_error_aborts_run() {
        let store = Arc::new(MemoryStore::new());
        preview_and_raw(&store);
        store.fail_listing();

        let err = resolver(&store).run().await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn test_preview_reports_decisions_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let (preview_id, raw_id) = preview_and_raw(&store);
        let a = sample_media(3, "a/one.jpg", 2_000_000);
        let b = sample_media(4, "b/two.png", 3_000_000);
        store.add_pair(a.id, b.id, 4);
        store.add_media(a);
        store.add_media(b);

        let decisions = resolver(&store).preview().await.unwrap();

        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].media_id, preview_id);
        assert_eq!(decisions[0].duplicate_id, raw_id);
        assert_eq!(decisions[0].decision.action, ResolutionAction::DeleteFirst);
        assert_eq!(decisions[1].decision.action, ResolutionAction::NoDecision);
        // Nothing was written.
        assert!(!store.media_snapshot(preview_id).unwrap().is_deleted);
        assert_eq!(store.pair_count(), 2);
    }

    #[tokio::test]
    async fn test_preview_flags_stale_pairs() {
        let store = Arc::new(MemoryStore::new());
        let preview = sample_media(1, "photos/IMG_0001.JPG", 2_000_000);
        let mut raw = sample_media(2, "photos/IMG_0001.NEF", 28_000_000);
        raw.is_deleted = true;
        store.add_pair(preview.id, raw.id, 3);
        store.add_media(preview);
        store.add_media(raw);

        let decisions = resolver(&store).preview().await.unwrap();

        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].decision.action, ResolutionAction::NoDecision);
        assert_eq!(decisions[0].decision.reason, "references already-deleted media");
    }
}
