//! # lumina-core
//!
//! Core types, traits, and abstractions for the lumina media library.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other lumina crates depend on: media and duplicate-pair models,
//! the shared error type, repository traits, and visual-hash utilities.

pub mod defaults;
pub mod error;
pub mod hash;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use hash::{hamming_distance, hash_bits, similarity_score};
pub use metadata::CaptureMetadata;
pub use models::*;
pub use traits::*;
