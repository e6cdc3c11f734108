//! Types for the block-indexer REST API

use serde::{Deserialize, Serialize};

/// Sort order for block queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	/// Ascending by seqno
	Asc,
	/// Descending by seqno
	Desc,
}

/// Filter parameters for the `/blocks` endpoint.
///
/// Every field is optional; absent fields are omitted from the query string
/// entirely. Values are not validated client-side — invalid combinations are
/// rejected by the remote service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetBlocksParams {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workchain: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shard: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seqno: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_utime: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_utime: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_lt: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_lt: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offset: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sort: Option<SortOrder>,
}

/// Reference to a block by its position in the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockId {
	pub workchain: i32,
	pub shard: String,
	pub seqno: u32,
}

/// One block record as returned by the indexer.
///
/// Immutable, read-only, sourced entirely from the remote service. The field
/// set mirrors the service's response schema exactly; decoding fails if any
/// required field is missing or has the wrong type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
	pub workchain: i32,
	pub shard: String,
	pub seqno: u32,
	pub root_hash: String,
	pub file_hash: String,
	pub global_id: i32,
	pub version: u32,
	pub after_merge: bool,
	pub before_split: bool,
	pub after_split: bool,
	pub want_merge: bool,
	pub want_split: bool,
	pub key_block: bool,
	pub vert_seqno_incr: bool,
	pub flags: u32,
	pub gen_utime: String,
	pub start_lt: String,
	pub end_lt: String,
	pub validator_list_hash_short: i32,
	pub gen_catchain_seqno: u32,
	pub min_ref_mc_seqno: u32,
	pub prev_key_block_seqno: u32,
	pub vert_seqno: u32,
	pub master_ref_seqno: Option<u32>,
	pub rand_seed: String,
	pub created_by: String,
	pub tx_count: Option<u64>,
	pub masterchain_block_ref: Option<BlockId>,
	pub prev_blocks: Vec<BlockId>,
}

/// Response envelope for the `/blocks` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct BlockList {
	pub blocks: Vec<Block>,
}

/// Error types for indexer API operations
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
	#[error("HTTP error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("Invalid response format: {0}")]
	InvalidResponse(String),
}
