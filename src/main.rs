use ton_client_kit::indexer::{GetBlocksParams, IndexerApiClient, SortOrder};
use ton_client_kit::wallet::WalletContractV5;

use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	// Initialize tracing subscriber with info logging by default
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting TON client demo");

	match WalletContractV5::create(None, [0u8; 32]) {
		Ok(wallet) => info!("Derived v5 wallet address {}", wallet.address),
		Err(e) => error!("Failed to derive wallet address: {}", e),
	}

	let client = IndexerApiClient::new("https://toncenter.com/api/v3".to_string(), None);

	let params = GetBlocksParams {
		limit: Some(10),
		sort: Some(SortOrder::Desc),
		..Default::default()
	};

	match client.get_blocks(&params).await {
		Ok(blocks) => {
			info!("Fetched {} blocks", blocks.len());
			for block in &blocks {
				info!(
					"Block ({}, {}, {}) txs={:?} prev={}",
					block.workchain,
					block.shard,
					block.seqno,
					block.tx_count,
					block.prev_blocks.len()
				);
			}
		}
		Err(e) => error!("Failed to fetch blocks: {}", e),
	}
}
