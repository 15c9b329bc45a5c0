//! Visual-hash utilities.
//!
//! Perceptual hashes arrive as fixed-length hexadecimal strings written by
//! the hashing pipeline. Distance is the Hamming distance over the decoded
//! bits. Two hashes are only comparable when their lengths match; malformed
//! or length-mismatched hashes never pair with anything and never abort a
//! computation.

/// Total number of bits encoded by a hex hash string.
pub fn hash_bits(hash: &str) -> u32 {
    (hash.len() * 4) as u32
}

/// Bitwise Hamming distance between two hex hash strings.
///
/// Returns `None` when the lengths differ or either string is not valid
/// hexadecimal.
pub fn hamming_distance(a: &str, b: &str) -> Option<u32> {
    if a.len() != b.len() {
        return None;
    }
    let a = hex::decode(a).ok()?;
    let b = hex::decode(b).ok()?;
    Some(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum(),
    )
}

/// Similarity score for a pair: `1 - distance / total_bits`, clamped to
/// `[0, 1]`. This is the convention the matcher stores alongside each pair,
/// so displays and tests agree with persisted scores.
pub fn similarity_score(distance: u32, hash_len: usize) -> f32 {
    let bits = (hash_len * 4) as f32;
    if bits == 0.0 {
        return 0.0;
    }
    (1.0 - distance as f32 / bits).clamp(0.0, 1.0)
}
