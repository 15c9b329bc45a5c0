//! Capture metadata attached to media records.
//!
//! Pixel dimensions and the capture timestamp arrive from the ingestion
//! pipeline's EXIF pass, already normalized onto the media row. Every field
//! is optional: a record may predate the metadata pass, or the source file
//! may simply not carry the tag. Resolution rules pattern-match on presence
//! and fall through to no-decision when a field they need is absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capture metadata for a media record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Original capture date/time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Pixel width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Pixel height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl CaptureMetadata {
    /// Width and height together, when both are recorded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}
