//!
//! The v5 wallet contract: deterministic address derivation, request payload
//! construction under signed and extension authorization, and the extension
//! dictionary codec. Network access is abstracted behind [`ContractProvider`]
//! so the same wallet logic runs against any TON API backend.

mod contract;
mod extensions;
mod message;
mod payload;
mod provider;
mod types;

pub use contract::{WalletContractV5, WalletSender};
pub use extensions::{decode_extensions, encode_extensions, extension_address, extension_key};
pub use message::internal_message;
pub use provider::{
	AccountStatus, ContractProvider, ContractState, ExternalSigner, GetMethodResult,
	ProviderError, TvmStackEntry,
};
pub use types::{
	ExternallySignedSendArgs, MAINNET_GLOBAL_ID, OutAction, SendMode, SignedAuthKind,
	SignedSendArgs, TESTNET_GLOBAL_ID, TransferArgs, Wallet5SendArgs, WalletError, WalletId,
	WalletVersion,
};
