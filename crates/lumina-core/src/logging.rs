//! Structured logging schema for the lumina crates.
//!
//! Call sites attach the same structured fields everywhere so log
//! aggregation tools can query by standardized names across subsystems:
//! `subsystem`, `component`, `op`, plus entity fields (`media_id`,
//! `duplicate_id`) and measurement fields (`processed`, `deleted`,
//! `duration_ms`). The constants below are the canonical `subsystem` values.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Store unreachable, batch aborted |
//! | WARN  | Per-pair write failure (counted, batch continues) |
//! | INFO  | Lifecycle events, batch summaries, manual operations |
//! | DEBUG | Per-pair decisions, group construction detail |
//! | TRACE | Not used |

/// Storage layer (pool, repositories).
pub const SUBSYSTEM_DB: &str = "db";

/// Resolution engine (grouper, resolver, manual service).
pub const SUBSYSTEM_DEDUP: &str = "dedup";
