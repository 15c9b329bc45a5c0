//! Core data models for lumina.
//!
//! These types are shared across all lumina crates and represent the domain
//! entities of the duplicate-resolution engine: media records, duplicate
//! pairs, derived similarity groups, and resolution decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::metadata::CaptureMetadata;

// =============================================================================
// MEDIA
// =============================================================================

/// A media record as stored by the library.
///
/// Owned by the ingestion pipeline; the resolution engine reads it and only
/// ever mutates the `is_deleted` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    /// Storage path relative to the library root.
    pub path: String,
    pub size_bytes: i64,
    /// Perceptual hash, fixed-length hex. Present only after hashing has run.
    pub visual_hash: Option<String>,
    pub capture: CaptureMetadata,
    /// Soft-delete flag. Deleted records are excluded from grouping and from
    /// further resolution.
    pub is_deleted: bool,
    /// Gallery visibility flag. Hidden media still participate in
    /// resolution.
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Media {
    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File extension, lower-cased. `None` for dotfiles and extensionless
    /// names.
    pub fn extension(&self) -> Option<String> {
        self.extension_verbatim().map(str::to_ascii_lowercase)
    }

    /// File extension exactly as written in the path.
    pub fn extension_verbatim(&self) -> Option<&str> {
        let (stem, ext) = self.file_name().rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext)
    }

    /// Whether the file carries a camera raw-format extension.
    pub fn is_raw(&self) -> bool {
        self.extension()
            .map_or(false, |ext| defaults::RAW_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Whether the file carries a processed preview extension (jpg/jpeg).
    pub fn is_preview(&self) -> bool {
        self.extension()
            .map_or(false, |ext| defaults::PREVIEW_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Whether the filename marks the file as extracted from inside another
    /// file (case-insensitive).
    pub fn has_embedded_marker(&self) -> bool {
        self.file_name()
            .to_ascii_lowercase()
            .contains(defaults::EMBEDDED_MARKER)
    }

    /// Whether the filename is entirely upper-case. Requires at least one
    /// alphabetic character, so purely numeric names do not qualify.
    pub fn has_upper_case_name(&self) -> bool {
        let name = self.file_name();
        name.chars().any(|c| c.is_ascii_alphabetic())
            && !name.chars().any(|c| c.is_ascii_lowercase())
    }
}

// =============================================================================
// DUPLICATE PAIRS
// =============================================================================

/// A stored duplicate relationship between two media records.
///
/// Written by the external matcher; destroyed by this engine when resolved
/// or dismissed. Symmetric in meaning even though the row is directed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub media_id: Uuid,
    pub duplicate_id: Uuid,
    /// Bit difference between the two visual hashes.
    pub hamming_distance: i32,
    /// `1 - distance / total_bits`, as stored by the matcher.
    pub similarity_score: f32,
    pub created_at: DateTime<Utc>,
}

/// A pair joined with both sides' media records, as the rule set consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairWithMedia {
    pub pair: DuplicatePair,
    /// First-listed side (`pair.media_id`).
    pub media: Media,
    /// Second-listed side (`pair.duplicate_id`).
    pub duplicate: Media,
}

// =============================================================================
// SIMILARITY GROUPS
// =============================================================================

/// Similarity band of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    /// All members share one identical hash.
    Exact,
    /// Near duplicates within a third of the distance threshold.
    High,
    /// Near duplicates up to the distance threshold.
    Medium,
}

impl Similarity {
    /// Distance cutoff for the `high` band under the given threshold.
    pub fn high_cutoff(threshold: u32) -> u32 {
        ((threshold + defaults::HIGH_BAND_DIVISOR - 1) / defaults::HIGH_BAND_DIVISOR).max(1)
    }

    /// Band for a group whose minimum pairwise distance is `distance`,
    /// grouped under `threshold`. Monotonic in distance.
    pub fn from_distance(distance: u32, threshold: u32) -> Self {
        if distance == 0 {
            Similarity::Exact
        } else if distance <= Self::high_cutoff(threshold) {
            Similarity::High
        } else {
            Similarity::Medium
        }
    }
}

impl std::fmt::Display for Similarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// A cluster of visually near-identical media.
///
/// Derived on each query from the media table; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Representative hash (the shared hash for exact groups, the first
    /// member's hash otherwise).
    pub hash: String,
    pub similarity: Similarity,
    /// Minimum pairwise Hamming distance between members. 0 for exact
    /// groups.
    pub min_distance: u32,
    /// Member records, ordered by id.
    pub members: Vec<Media>,
}

/// Dashboard counters over a group listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_groups: usize,
    pub total_duplicate_items: usize,
    pub exact_matches: usize,
    pub similar_matches: usize,
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Which side of a pair a resolution decision removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    /// Delete the first-listed side (`media_id`).
    DeleteFirst,
    /// Delete the second-listed side (`duplicate_id`).
    DeleteSecond,
    /// Leave the pair untouched.
    NoDecision,
}

impl std::fmt::Display for ResolutionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteFirst => write!(f, "delete_first"),
            Self::DeleteSecond => write!(f, "delete_second"),
            Self::NoDecision => write!(f, "no_decision"),
        }
    }
}

/// Outcome of evaluating one pair against the rule set.
///
/// Transient: acted on immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDecision {
    pub action: ResolutionAction,
    pub reason: String,
    /// Rule confidence in `[0, 1]`.
    pub confidence: f32,
}

impl ResolutionDecision {
    pub fn delete_first(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: ResolutionAction::DeleteFirst,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn delete_second(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: ResolutionAction::DeleteSecond,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn no_decision(reason: impl Into<String>) -> Self {
        Self {
            action: ResolutionAction::NoDecision,
            reason: reason.into(),
            confidence: 0.0,
        }
    }
}

/// A pending pair with the decision the rule set would take, for operator
/// review before a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairDecision {
    pub media_id: Uuid,
    pub duplicate_id: Uuid,
    pub decision: ResolutionDecision,
}

/// Counters from one auto-resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Pairs examined.
    pub processed: u64,
    /// Media records newly marked deleted.
    pub deleted: u64,
    /// Pairs left pending (no decision) or cleaned up without a deletion.
    pub skipped: u64,
    /// Pairs hit by a per-pair store write failure.
    pub failed: u64,
}
