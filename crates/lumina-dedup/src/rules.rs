//! Ordered resolution rules for duplicate pairs.
//!
//! Each rule inspects a pair and either names the side to delete or passes.
//! Rules run in a fixed order and the first match wins:
//!
//! 1. `fixed_dimension` - drop 500x500 placeholder artifacts
//! 2. `tiny_file` - drop files under 1024 bytes
//! 3. `preview_of_raw` - drop a JPEG preview paired with its raw original
//! 4. `embedded_copy` - drop an extracted embedded JPEG
//! 5. `exact_duplicate` - identical metadata, drop the first-listed side
//! 6. `raw_case_preference` - matching raws, keep the upper-case filename
//! 7. `smallest_of_identical` - identical capture, drop the smaller file
//!
//! Evaluation is total: a pair no rule matches comes back as a no-decision,
//! never an error. Rules that compare capture metadata pass whenever a field
//! they need is missing on either side.

use std::cmp::Ordering;

use lumina_core::{defaults, Media, ResolutionDecision};

/// One resolution rule. See the module docs for the default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    FixedDimension,
    TinyFile,
    PreviewOfRaw,
    EmbeddedCopy,
    ExactDuplicate,
    RawCasePreference,
    SmallestOfIdentical,
}

impl Rule {
    /// Every rule, in evaluation order.
    pub const DEFAULT_ORDER: [Rule; 7] = [
        Rule::FixedDimension,
        Rule::TinyFile,
        Rule::PreviewOfRaw,
        Rule::EmbeddedCopy,
        Rule::ExactDuplicate,
        Rule::RawCasePreference,
        Rule::SmallestOfIdentical,
    ];

    /// Stable identifier for logs and operator surfaces.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::FixedDimension => "fixed_dimension",
            Rule::TinyFile => "tiny_file",
            Rule::PreviewOfRaw => "preview_of_raw",
            Rule::EmbeddedCopy => "embedded_copy",
            Rule::ExactDuplicate => "exact_duplicate",
            Rule::RawCasePreference => "raw_case_preference",
            Rule::SmallestOfIdentical => "smallest_of_identical",
        }
    }

    /// Apply this rule to a pair. `None` means the rule does not match and
    /// evaluation moves on.
    pub fn apply(&self, first: &Media, second: &Media) -> Option<ResolutionDecision> {
        match self {
            Rule::FixedDimension => fixed_dimension(first, second),
            Rule::TinyFile => tiny_file(first, second),
            Rule::PreviewOfRaw => preview_of_raw(first, second),
            Rule::EmbeddedCopy => embedded_copy(first, second),
            Rule::ExactDuplicate => exact_duplicate(first, second),
            Rule::RawCasePreference => raw_case_preference(first, second),
            Rule::SmallestOfIdentical => smallest_of_identical(first, second),
        }
    }
}

/// Evaluate a pair against the default rule order.
pub fn evaluate(first: &Media, second: &Media) -> ResolutionDecision {
    evaluate_with(&Rule::DEFAULT_ORDER, first, second)
}

/// Evaluate a pair against an explicit rule order, first match wins.
pub fn evaluate_with(rules: &[Rule], first: &Media, second: &Media) -> ResolutionDecision {
    for rule in rules {
        if let Some(decision) = rule.apply(first, second) {
            return decision;
        }
    }
    ResolutionDecision::no_decision("no rule matched")
}

// =============================================================================
// INDIVIDUAL RULES
// =============================================================================

/// Some export pipelines emit square 500x500 placeholder renditions. They are
/// never the copy worth keeping.
fn fixed_dimension(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    let artifact = |m: &Media| {
        m.capture.dimensions()
            == Some((defaults::ARTIFACT_DIMENSION, defaults::ARTIFACT_DIMENSION))
    };
    if artifact(first) {
        Some(ResolutionDecision::delete_first("fixed 500x500 artifact", 1.0))
    } else if artifact(second) {
        Some(ResolutionDecision::delete_second("fixed 500x500 artifact", 1.0))
    } else {
        None
    }
}

/// Files under 1024 bytes are corrupt or degenerate thumbnails, not photos.
/// Passes when both sides are tiny: with no healthy copy on either side the
/// pair is left for review.
fn tiny_file(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    let tiny = |m: &Media| m.size_bytes < defaults::TINY_FILE_BYTES;
    match (tiny(first), tiny(second)) {
        (true, false) => Some(ResolutionDecision::delete_first("file under 1024 bytes", 0.9)),
        (false, true) => Some(ResolutionDecision::delete_second("file under 1024 bytes", 0.9)),
        _ => None,
    }
}

/// A JPEG paired with a raw file and strictly smaller than it is the camera's
/// preview rendition of that raw.
fn preview_of_raw(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    if first.is_preview() && second.is_raw() && first.size_bytes < second.size_bytes {
        return Some(ResolutionDecision::delete_first("preview of raw original", 0.95));
    }
    if second.is_preview() && first.is_raw() && second.size_bytes < first.size_bytes {
        return Some(ResolutionDecision::delete_second("preview of raw original", 0.95));
    }
    None
}

/// A JPEG whose filename carries the embedded marker was extracted from
/// inside another file. It loses to a raw partner or to a partner more than
/// twice its size.
fn embedded_copy(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    let embedded = |m: &Media| m.has_embedded_marker() && m.is_preview();
    let outranked = |m: &Media, other: &Media| {
        other.is_raw()
            || other.size_bytes > m.size_bytes.saturating_mul(defaults::EMBEDDED_SIZE_RATIO)
    };
    if embedded(first) && outranked(first, second) {
        return Some(ResolutionDecision::delete_first("embedded copy of original", 0.95));
    }
    if embedded(second) && outranked(second, first) {
        return Some(ResolutionDecision::delete_second("embedded copy of original", 0.95));
    }
    None
}

/// Same extension, byte size, capture time, and dimensions on both sides:
/// the files are interchangeable, so the first-listed side goes.
fn exact_duplicate(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    if first.extension()? != second.extension()? {
        return None;
    }
    if first.size_bytes != second.size_bytes {
        return None;
    }
    if first.capture.timestamp? != second.capture.timestamp? {
        return None;
    }
    if first.capture.dimensions()? != second.capture.dimensions()? {
        return None;
    }
    Some(ResolutionDecision::delete_first("identical capture metadata", 1.0))
}

/// Two raw files from the same capture where exactly one filename is fully
/// upper case: keep the upper-case one, the camera's own naming.
fn raw_case_preference(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    if !first.is_raw() || !second.is_raw() {
        return None;
    }
    if first.capture.timestamp? != second.capture.timestamp? {
        return None;
    }
    match (first.has_upper_case_name(), second.has_upper_case_name()) {
        (true, false) => Some(ResolutionDecision::delete_second("lower-case raw filename", 1.0)),
        (false, true) => Some(ResolutionDecision::delete_first("lower-case raw filename", 1.0)),
        _ => None,
    }
}

/// Same dimensions and capture time but different byte sizes: keep the
/// larger encoding of the same capture. Only fires on a literal extension
/// match where both are lower case, so camera-written upper-case names stay
/// out of its reach.
fn smallest_of_identical(first: &Media, second: &Media) -> Option<ResolutionDecision> {
    let ext_first = first.extension_verbatim()?;
    let ext_second = second.extension_verbatim()?;
    if ext_first != ext_second || ext_first.chars().any(|c| c.is_ascii_uppercase()) {
        return None;
    }
    if first.capture.dimensions()? != second.capture.dimensions()? {
        return None;
    }
    if first.capture.timestamp? != second.capture.timestamp? {
        return None;
    }
    match first.size_bytes.cmp(&second.size_bytes) {
        Ordering::Less => {
            Some(ResolutionDecision::delete_first("smaller copy of identical capture", 1.0))
        }
        Ordering::Greater => {
            Some(ResolutionDecision::delete_second("smaller copy of identical capture", 1.0))
        }
        Ordering::Equal => None,
    }
}
