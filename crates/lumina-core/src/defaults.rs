//! Centralized default constants for the lumina duplicate-resolution engine.
//!
//! **This module is the single source of truth** for all shared default
//! values. The other crates reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// SIMILARITY
// =============================================================================

/// Maximum Hamming distance (in bits) at which two visual hashes still count
/// as near duplicates. Matches the matcher's pairing threshold.
pub const MAX_HAMMING_DISTANCE: u32 = 10;

/// Divisor applied to the distance threshold to derive the `high` similarity
/// band cutoff (rounded up, minimum 1).
pub const HIGH_BAND_DIVISOR: u32 = 3;

// =============================================================================
// RESOLUTION RULES
// =============================================================================

/// Byte size below which a media file is treated as a degenerate artifact
/// rather than a real photo (1 KiB).
pub const TINY_FILE_BYTES: i64 = 1024;

/// Edge length of the square placeholder images some export pipelines emit.
pub const ARTIFACT_DIMENSION: u32 = 500;

/// Size multiple beyond which a paired original dwarfs an embedded copy.
pub const EMBEDDED_SIZE_RATIO: i64 = 2;

/// Filename marker identifying a preview extracted from inside another file.
pub const EMBEDDED_MARKER: &str = "embedded";

// =============================================================================
// FILE FORMATS
// =============================================================================

/// Camera raw-format file extensions, lower case.
pub const RAW_EXTENSIONS: &[&str] = &[
    "sr2", "nef", "arw", "cr2", "dng", "raf", "rw2", "orf", "pef", "3fr",
    "fff", "iiq", "rwl", "srw", "x3f",
];

/// Processed preview extensions, lower case.
pub const PREVIEW_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
