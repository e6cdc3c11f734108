//! Indexer integration module for the TON blockchain
//!
//! This module provides the client and types for interacting with a TON
//! block-indexing REST service. The indexer tracks chain state and exposes
//! a `/blocks` endpoint for querying block records by workchain, shard,
//! seqno, time and logical-time ranges.

/// REST client for the block-indexer API
mod client;
/// Type definitions for indexer data structures
mod types;

pub use client::IndexerApiClient;
pub use types::*;
