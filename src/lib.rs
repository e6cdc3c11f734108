//!
//! Client kit for the TON blockchain: a typed REST client for a
//! block-indexer API and a v5 wallet contract helper for building, signing
//! and submitting wallet requests.

pub mod indexer;
pub mod wallet;
