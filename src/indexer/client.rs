//!
//! REST client for a TON block-indexing service.
//!
//! This module provides an async client for the indexer's `/blocks` endpoint.
//! Each call issues exactly one HTTP GET and validates the response body
//! against the expected block-list shape before returning typed records.
//! There is no retry, no caching, and no pagination loop — callers page
//! manually via the `limit`/`offset` filter fields.

use super::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// REST client for the block-indexer API
#[derive(Clone)]
pub struct IndexerApiClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// The base URL of the indexer API, without a trailing slash.
	base_url: String,
	/// Optional API key sent as the `X-API-Key` header.
	api_key: Option<String>,
}

impl IndexerApiClient {
	/// Create a new indexer API client.
	///
	/// # Arguments
	/// * `base_url` - The base URL of the indexer API, e.g. `https://toncenter.com/api/v3`.
	/// * `api_key` - Optional API key; when present it is attached to every request.
	///
	/// # Returns
	/// A new `IndexerApiClient` instance.
	pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
		let http_client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.expect("Failed to create HTTP client");

		Self {
			http_client,
			base_url: base_url.into(),
			api_key,
		}
	}

	/// Fetch blocks matching the given filter.
	///
	/// Issues a single `GET {base_url}/blocks` with the filter serialized as
	/// query parameters; absent filter fields are omitted from the query
	/// string. The response body is validated against the expected shape
	/// before any data is returned — on mismatch the whole call fails, never
	/// returning partial data.
	///
	/// # Arguments
	/// * `params` - The block filter; see [`GetBlocksParams`].
	///
	/// # Returns
	/// The matching blocks, or an `IndexerError` on transport or
	/// shape-validation failure.
	pub async fn get_blocks(&self, params: &GetBlocksParams) -> Result<Vec<Block>, IndexerError> {
		debug!("Fetching blocks from {}/blocks", self.base_url);

		let mut request = self
			.http_client
			.get(format!("{}/blocks", self.base_url))
			.query(params);
		if let Some(api_key) = &self.api_key {
			request = request.header("X-API-Key", api_key);
		}

		let response = request.send().await?.error_for_status()?;
		let body: serde_json::Value = response.json().await?;

		let block_list: BlockList = serde_json::from_value(body)
			.map_err(|e| IndexerError::InvalidResponse(e.to_string()))?;

		debug!("Fetched {} blocks", block_list.blocks.len());
		Ok(block_list.blocks)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use httpmock::prelude::*;
	use serde_json::json;

	fn sample_block(seqno: u32) -> serde_json::Value {
		json!({
			"workchain": -1,
			"shard": "8000000000000000",
			"seqno": seqno,
			"root_hash": "x1CumAk/T10kCKUyE77284g6BYWidnB6fxsskgkFBVI=",
			"file_hash": "HS2zT6jLdzORv3czBE1pPlC5DDnjpCSfpEJhvkqBz+s=",
			"global_id": -239,
			"version": 0,
			"after_merge": false,
			"before_split": false,
			"after_split": false,
			"want_merge": true,
			"want_split": false,
			"key_block": false,
			"vert_seqno_incr": false,
			"flags": 1,
			"gen_utime": "1698489984",
			"start_lt": "42007668000000",
			"end_lt": "42007668000004",
			"validator_list_hash_short": 1645315393,
			"gen_catchain_seqno": 485815,
			"min_ref_mc_seqno": seqno.saturating_sub(1),
			"prev_key_block_seqno": 34242300,
			"vert_seqno": 1,
			"master_ref_seqno": null,
			"rand_seed": "kGaBCBjHdMT0lUMHEL4W3L9cV4EqTFBGGAEXNyjLrWc=",
			"created_by": "ZOnV8TMuAZwtPfODuq8fSkJPqQf+MRkNpWcYVCC0vmw=",
			"tx_count": 3,
			"masterchain_block_ref": null,
			"prev_blocks": [
				{ "workchain": -1, "shard": "8000000000000000", "seqno": seqno.saturating_sub(1) }
			]
		})
	}

	fn sample_block_list(count: u32) -> serde_json::Value {
		json!({ "blocks": (0..count).map(|i| sample_block(1000 + i)).collect::<Vec<_>>() })
	}

	#[tokio::test]
	async fn fetches_blocks_with_filter_params_in_query() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/blocks")
					.query_param("limit", "10")
					.query_param("sort", "asc");
				then.status(200).json_body(sample_block_list(10));
			})
			.await;

		let client = IndexerApiClient::new(server.base_url(), None);
		let blocks = client
			.get_blocks(&GetBlocksParams {
				limit: Some(10),
				sort: Some(SortOrder::Asc),
				..Default::default()
			})
			.await
			.expect("Failed to fetch blocks");

		mock.assert_async().await;
		assert_eq!(blocks.len(), 10);
		assert_eq!(blocks[0].prev_blocks.len(), 1);
		assert_eq!(blocks[0].prev_blocks[0].seqno, 999);
		assert_eq!(blocks[0].masterchain_block_ref, None);
	}

	#[tokio::test]
	async fn attaches_api_key_header_when_configured() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/blocks")
					.header("X-API-Key", "test-key");
				then.status(200).json_body(sample_block_list(1));
			})
			.await;

		let client = IndexerApiClient::new(server.base_url(), Some("test-key".to_string()));
		client
			.get_blocks(&GetBlocksParams::default())
			.await
			.expect("Failed to fetch blocks");

		mock.assert_async().await;
	}

	#[tokio::test]
	async fn fails_with_invalid_response_on_shape_mismatch() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/blocks");
				// `seqno` has the wrong type and most required fields are missing
				then.status(200)
					.json_body(json!({ "blocks": [{ "workchain": 0, "seqno": "not-a-number" }] }));
			})
			.await;

		let client = IndexerApiClient::new(server.base_url(), None);
		let err = client
			.get_blocks(&GetBlocksParams::default())
			.await
			.expect_err("Expected shape validation to fail");

		assert!(matches!(err, IndexerError::InvalidResponse(_)));
	}

	#[tokio::test]
	async fn fails_with_transport_error_on_http_status() {
		let server = MockServer::start_async().await;
		server
			.mock_async(|when, then| {
				when.method(GET).path("/blocks");
				then.status(500);
			})
			.await;

		let client = IndexerApiClient::new(server.base_url(), None);
		let err = client
			.get_blocks(&GetBlocksParams::default())
			.await
			.expect_err("Expected transport error");

		assert!(matches!(err, IndexerError::Transport(_)));
	}

	#[test]
	fn absent_filter_fields_are_omitted_from_serialization() {
		let params = GetBlocksParams {
			workchain: Some(-1),
			limit: Some(5),
			..Default::default()
		};
		let value = serde_json::to_value(&params).expect("Failed to serialize params");
		let object = value.as_object().expect("Expected object");

		assert_eq!(object.len(), 2);
		assert_eq!(object.get("workchain"), Some(&json!(-1)));
		assert_eq!(object.get("limit"), Some(&json!(5)));
		assert!(!object.contains_key("shard"));
		assert!(!object.contains_key("sort"));

		let empty = serde_json::to_value(GetBlocksParams::default()).unwrap();
		assert_eq!(empty.as_object().unwrap().len(), 0);
	}
}
