//! Similarity grouping over hashed media.
//!
//! Media with identical hashes form `exact` groups unconditionally. The
//! remaining media (unique hash values) are joined into near-duplicate
//! groups wherever their pairwise Hamming distance stays within the
//! threshold; membership is transitive, so a chain of near matches forms a
//! single group. Groups are derived data, rebuilt on every query and never
//! persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use lumina_core::hash::hamming_distance;
use lumina_core::logging::SUBSYSTEM_DEDUP;
use lumina_core::{DuplicateGroup, GroupStats, Media, MediaRepository, Result, Similarity};

use crate::config::DedupConfig;
use crate::union_find::UnionFind;

/// Read-only grouping service over a media repository.
pub struct SimilarityGrouper {
    media: Arc<dyn MediaRepository>,
    config: DedupConfig,
}

impl SimilarityGrouper {
    pub fn new(media: Arc<dyn MediaRepository>, config: DedupConfig) -> Self {
        Self { media, config }
    }

    /// Group all hashed, undeleted media under the configured threshold.
    pub async fn group(&self) -> Result<Vec<DuplicateGroup>> {
        let items = self.media.list_hashed().await?;
        let groups = group_media(items, self.config.max_hamming_distance);

        debug!(
            subsystem = SUBSYSTEM_DEDUP,
            component = "grouper",
            op = "group",
            max_distance = self.config.max_hamming_distance,
            group_count = groups.len(),
            "Built duplicate groups"
        );
        Ok(groups)
    }
}

/// Partition media into duplicate groups under `max_distance`.
///
/// Pure: no side effects, deterministic for a given input set. Records
/// without a hash are ignored. Groups come back ordered for display: exact
/// groups first, then larger groups, then closer groups, with the
/// representative hash as the final tie-break. Members are ordered by id.
pub fn group_media(items: Vec<Media>, max_distance: u32) -> Vec<DuplicateGroup> {
    let hashed: Vec<Media> = items
        .into_iter()
        .filter(|m| m.visual_hash.is_some())
        .collect();

    // Equivalence classes by exact hash string.
    let mut by_hash: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, media) in hashed.iter().enumerate() {
        if let Some(hash) = media.visual_hash.as_deref() {
            by_hash.entry(hash).or_default().push(idx);
        }
    }

    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut remaining: Vec<(usize, &str)> = Vec::new();

    for (&hash, indices) in &by_hash {
        if indices.len() > 1 {
            groups.push(build_group(&hashed, indices, 0, max_distance));
        } else {
            remaining.push((indices[0], hash));
        }
    }
    remaining.sort_unstable_by_key(|&(idx, _)| idx);

    // Connected components over the unique hashes within the threshold.
    let mut uf = UnionFind::new(remaining.len());
    for i in 0..remaining.len() {
        for j in (i + 1)..remaining.len() {
            if let Some(d) = hamming_distance(remaining[i].1, remaining[j].1) {
                if d <= max_distance {
                    uf.union(i, j);
                }
            }
        }
    }

    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for pos in 0..remaining.len() {
        components.entry(uf.find(pos)).or_default().push(pos);
    }

    for positions in components.values() {
        if positions.len() < 2 {
            continue;
        }
        let mut min_distance = u32::MAX;
        for (i, &p) in positions.iter().enumerate() {
            for &q in &positions[i + 1..] {
                if let Some(d) = hamming_distance(remaining[p].1, remaining[q].1) {
                    min_distance = min_distance.min(d);
                }
            }
        }
        let indices: Vec<usize> = positions.iter().map(|&p| remaining[p].0).collect();
        groups.push(build_group(&hashed, &indices, min_distance, max_distance));
    }

    let near_rank = |g: &DuplicateGroup| u8::from(g.similarity != Similarity::Exact);
    groups.sort_by(|a, b| {
        near_rank(a)
            .cmp(&near_rank(b))
            .then(b.members.len().cmp(&a.members.len()))
            .then(a.min_distance.cmp(&b.min_distance))
            .then(a.hash.cmp(&b.hash))
    });
    groups
}

/// Dashboard counters for a group listing.
pub fn group_stats(groups: &[DuplicateGroup]) -> GroupStats {
    let exact_matches = groups
        .iter()
        .filter(|g| g.similarity == Similarity::Exact)
        .count();
    GroupStats {
        total_groups: groups.len(),
        total_duplicate_items: groups.iter().map(|g| g.members.len()).sum(),
        exact_matches,
        similar_matches: groups.len() - exact_matches,
    }
}

fn build_group(
    hashed: &[Media],
    indices: &[usize],
    min_distance: u32,
    threshold: u32,
) -> DuplicateGroup {
    let mut members: Vec<Media> = indices.iter().map(|&i| hashed[i].clone()).collect();
    members.sort_by_key(|m| m.id);
    let hash = members
        .first()
        .and_then(|m| m.visual_hash.clone())
        .unwrap_or_default();
    DuplicateGroup {
        hash,
        similarity: Similarity::from_distance(min_distance, threshold),
        min_distance,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lumina_core::CaptureMetadata;
    use uuid::Uuid;

    fn media_with_hash(seq: u128, hash: &str) -> Media {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Media {
            id: Uuid::from_u128(seq),
            path: format!("photos/img_{seq}.jpg"),
            size_bytes: 2_000_000,
            visual_hash: Some(hash.to_string()),
            capture: CaptureMetadata::default(),
            is_deleted: false,
            is_hidden: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_media(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_unhashed_media_are_ignored() {
        let mut orphan = media_with_hash(1, "");
        orphan.visual_hash = None;
        assert!(group_media(vec![orphan], 10).is_empty());
    }

    #[test]
    fn test_identical_hashes_form_exact_group_at_zero_threshold() {
        let items = vec![
            media_with_hash(1, "d1c4f0a5e2b39876"),
            media_with_hash(2, "d1c4f0a5e2b39876"),
        ];
        let groups = group_media(items, 0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].similarity, Similarity::Exact);
        assert_eq!(groups[0].min_distance, 0);
        assert_eq!(groups[0].hash, "d1c4f0a5e2b39876");
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_members_are_ordered_by_id() {
        let items = vec![
            media_with_hash(9, "d1c4f0a5e2b39876"),
            media_with_hash(3, "d1c4f0a5e2b39876"),
            media_with_hash(5, "d1c4f0a5e2b39876"),
        ];
        let groups = group_media(items, 0);
        let ids: Vec<Uuid> = groups[0].members.iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(3), Uuid::from_u128(5), Uuid::from_u128(9)]
        );
    }

    #[test]
    fn test_near_chain_is_transitively_grouped() {
        // d(a,b) = 3, d(b,c) = 4, d(a,c) = 7: only the chain is within
        // threshold 5, yet all three must land in one group.
        let a = media_with_hash(1, "0000000000000000");
        let b = media_with_hash(2, "0000000000000007");
        let c = media_with_hash(3, "00000000000000f7");
        let groups = group_media(vec![a, b, c], 5);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 3);
        assert_eq!(groups[0].min_distance, 3);
    }

    #[test]
    fn test_distance_equal_to_threshold_still_groups() {
        let a = media_with_hash(1, "0000000000000000");
        let b = media_with_hash(2, "000000000000000f");
        assert_eq!(group_media(vec![a.clone(), b.clone()], 4).len(), 1);
        assert!(group_media(vec![a, b], 3).is_empty());
    }

    #[test]
    fn test_exact_class_members_do_not_join_near_groups() {
        // Two identical hashes become an exact group; a third hash two bits
        // away stays out even though it is within the threshold.
        let items = vec![
            media_with_hash(1, "0000000000000000"),
            media_with_hash(2, "0000000000000000"),
            media_with_hash(3, "0000000000000003"),
        ];
        let groups = group_media(items, 10);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].similarity, Similarity::Exact);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_banding_by_minimum_distance() {
        // Threshold 10: high cutoff is 4. One pair at distance 4, another
        // at distance 5, far enough apart to stay separate groups.
        let items = vec![
            media_with_hash(1, "0000000000000000"),
            media_with_hash(2, "000000000000000f"),
            media_with_hash(3, "ffff000000000000"),
            media_with_hash(4, "ffff00000000001f"),
        ];
        let groups = group_media(items, 10);
        assert_eq!(groups.len(), 2);
        let high = groups.iter().find(|g| g.min_distance == 4).unwrap();
        let medium = groups.iter().find(|g| g.min_distance == 5).unwrap();
        assert_eq!(high.similarity, Similarity::High);
        assert_eq!(medium.similarity, Similarity::Medium);
    }

    #[test]
    fn test_malformed_hashes_never_pair() {
        let items = vec![
            media_with_hash(1, "zzzzzzzzzzzzzzzz"),
            media_with_hash(2, "0000000000000000"),
        ];
        assert!(group_media(items, 10).is_empty());
    }

    #[test]
    fn test_identical_malformed_hashes_still_form_exact_group() {
        // String equality, not decodability, drives exact classes.
        let items = vec![
            media_with_hash(1, "zzzzzzzzzzzzzzzz"),
            media_with_hash(2, "zzzzzzzzzzzzzzzz"),
        ];
        let groups = group_media(items, 10);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].similarity, Similarity::Exact);
    }

    #[test]
    fn test_length_mismatch_never_pairs() {
        let items = vec![
            media_with_hash(1, "0000"),
            media_with_hash(2, "0000000000000000"),
        ];
        assert!(group_media(items, 64).is_empty());
    }

    #[test]
    fn test_group_ordering_exact_then_size_then_distance() {
        let items = vec![
            // Near triple (chain at distance 3/4).
            media_with_hash(1, "0000000000000000"),
            media_with_hash(2, "0000000000000007"),
            media_with_hash(3, "00000000000000f7"),
            // Exact pair.
            media_with_hash(4, "ffffffffffffffff"),
            media_with_hash(5, "ffffffffffffffff"),
        ];
        let groups = group_media(items, 10);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].similarity, Similarity::Exact);
        assert_eq!(groups[1].members.len(), 3);
    }

    #[test]
    fn test_grouping_is_deterministic_under_input_order() {
        let items = vec![
            media_with_hash(1, "0000000000000000"),
            media_with_hash(2, "0000000000000007"),
            media_with_hash(3, "ffffffffffffffff"),
            media_with_hash(4, "ffffffffffffffff"),
        ];
        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(group_media(items, 10), group_media(reversed, 10));
    }

    #[test]
    fn test_group_stats() {
        let items = vec![
            media_with_hash(1, "0000000000000000"),
            media_with_hash(2, "0000000000000000"),
            media_with_hash(3, "ffff000000000000"),
            media_with_hash(4, "ffff000000000003"),
        ];
        let groups = group_media(items, 10);
        let stats = group_stats(&groups);
        assert_eq!(stats.total_groups, 2);
        assert_eq!(stats.total_duplicate_items, 4);
        assert_eq!(stats.exact_matches, 1);
        assert_eq!(stats.similar_matches, 1);
    }

    #[test]
    fn test_stats_of_empty_listing() {
        assert_eq!(group_stats(&[]), GroupStats::default());
    }
}
