//! Types for the v5 wallet contract helper

use crate::wallet::provider::ProviderError;

use ed25519_dalek::SigningKey;
use num_bigint::BigUint;
use std::ops::BitOr;
use tonlib_core::TonAddress;
use tonlib_core::cell::{ArcCell, TonCellError};

/// Network global id for the TON mainnet, as embedded in v5 wallet ids.
pub const MAINNET_GLOBAL_ID: i32 = -239;
/// Network global id for the TON testnet.
pub const TESTNET_GLOBAL_ID: i32 = -3;

/// Wallet contract version tag encoded into the wallet id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletVersion {
	V5,
}

impl WalletVersion {
	/// The 8-bit version code used in the wallet id serialization
	pub fn code(&self) -> u8 {
		match self {
			WalletVersion::V5 => 0,
		}
	}
}

/// Identity parameters of one wallet contract instance.
///
/// Immutable once the wallet is created; encoded into contract storage at
/// construction, so any change produces a different contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletId {
	/// Network the wallet is bound to ([`MAINNET_GLOBAL_ID`] or [`TESTNET_GLOBAL_ID`]).
	pub network_global_id: i32,
	/// Workchain the wallet lives in.
	pub workchain: i8,
	/// Subwallet number, allowing several wallets per key pair.
	pub subwallet_number: u32,
	/// Wallet contract version.
	pub wallet_version: WalletVersion,
}

impl Default for WalletId {
	/// Mainnet, basechain, subwallet 0, version v5
	fn default() -> Self {
		Self {
			network_global_id: MAINNET_GLOBAL_ID,
			workchain: 0,
			subwallet_number: 0,
			wallet_version: WalletVersion::V5,
		}
	}
}

/// Outbound message send mode as a set of named flags.
///
/// Combined with `|`; the numeric value is the bitwise OR of the flags, which
/// is what the wallet contract expects in the action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendMode(u8);

impl SendMode {
	/// No flags set
	pub const ORDINARY: SendMode = SendMode(0);
	/// Pay transfer fees separately from the message value
	pub const PAY_GAS_SEPARATELY: SendMode = SendMode(1);
	/// Ignore errors arising while processing this message
	pub const IGNORE_ERRORS: SendMode = SendMode(2);
	/// Destroy the account if its balance reaches zero
	pub const DESTROY_ACCOUNT_IF_ZERO: SendMode = SendMode(32);
	/// Carry all the remaining value of the inbound message
	pub const CARRY_ALL_REMAINING_INCOMING_VALUE: SendMode = SendMode(64);
	/// Carry all the remaining contract balance
	pub const CARRY_ALL_REMAINING_BALANCE: SendMode = SendMode(128);

	/// Default mode for wallet transfers when none is supplied
	pub const DEFAULT_TRANSFER: SendMode =
		SendMode(SendMode::PAY_GAS_SEPARATELY.0 | SendMode::IGNORE_ERRORS.0);

	/// The raw 8-bit value encoded into the action list
	pub fn bits(self) -> u8 {
		self.0
	}
}

impl BitOr for SendMode {
	type Output = SendMode;

	fn bitor(self, rhs: SendMode) -> SendMode {
		SendMode(self.0 | rhs.0)
	}
}

/// One action of a wallet request
#[derive(Debug, Clone)]
pub enum OutAction {
	/// Send an outbound message. A `None` mode takes the request-level
	/// default at payload-encoding time.
	SendMsg {
		mode: Option<SendMode>,
		/// Encoded relaxed message cell, see [`crate::wallet::internal_message`]
		message: ArcCell,
	},
	/// Authorize an extension address to act on behalf of the wallet
	AddExtension { address: TonAddress },
	/// Revoke an extension's authorization
	RemoveExtension { address: TonAddress },
}

/// Common fields of a signed-auth request.
///
/// Not `Debug`: the signing key must never end up in log output.
#[derive(Clone)]
pub struct SignedSendArgs {
	/// Current wallet seqno, guarding replay
	pub seqno: u32,
	/// Default send mode for actions without an explicit one
	pub send_mode: Option<SendMode>,
	/// Absolute unix expiry of the request; defaults to now + 60s
	pub timeout: Option<u32>,
	/// Key the request is signed with
	pub secret_key: SigningKey,
}

/// Authorization for a wallet request.
///
/// Modeled as a sum type so each variant carries only the fields its auth
/// path actually uses: extension-authorized requests carry no seqno, no
/// expiry and no signing material.
#[derive(Clone)]
pub enum Wallet5SendArgs {
	/// Signed request delivered as an external message
	SignedExternal(SignedSendArgs),
	/// Signed request delivered as an internal message
	SignedInternal(SignedSendArgs),
	/// Request authorized by an already-installed extension
	Extension { send_mode: Option<SendMode> },
}

impl Wallet5SendArgs {
	/// The default send mode carried by these args, if any
	pub fn send_mode(&self) -> Option<SendMode> {
		match self {
			Wallet5SendArgs::SignedExternal(args) | Wallet5SendArgs::SignedInternal(args) => {
				args.send_mode
			}
			Wallet5SendArgs::Extension { send_mode } => *send_mode,
		}
	}
}

/// Delivery kind of an externally signed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedAuthKind {
	External,
	Internal,
}

/// Arguments for the externally-signed (e.g. hardware signer) request path.
///
/// The signature itself is produced by an [`crate::wallet::ExternalSigner`]
/// passed alongside these args; everything else matches [`SignedSendArgs`].
#[derive(Debug, Clone, Copy)]
pub struct ExternallySignedSendArgs {
	pub auth: SignedAuthKind,
	pub seqno: u32,
	pub send_mode: Option<SendMode>,
	pub timeout: Option<u32>,
}

/// A minimal outbound transfer description for the generic sender path
#[derive(Debug, Clone)]
pub struct TransferArgs {
	pub to: TonAddress,
	/// Amount in nanotons
	pub value: BigUint,
	pub bounce: bool,
	pub body: Option<ArcCell>,
	pub state_init: Option<ArcCell>,
	pub send_mode: Option<SendMode>,
}

/// Error types for wallet contract operations
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
	#[error("Provider error: {0}")]
	Provider(#[from] ProviderError),

	#[error("Cell error: {0}")]
	Cell(#[from] TonCellError),

	#[error("Signature error: {0}")]
	Signature(String),

	#[error("Invalid extension dictionary: {0}")]
	InvalidExtensionDict(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn send_mode_flags_combine_bitwise() {
		let mode = SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS;
		assert_eq!(mode.bits(), 3);
		assert_eq!(mode, SendMode::DEFAULT_TRANSFER);

		let mode = SendMode::CARRY_ALL_REMAINING_BALANCE | SendMode::IGNORE_ERRORS;
		assert_eq!(mode.bits(), 130);
	}

	#[test]
	fn default_wallet_id_targets_mainnet_basechain() {
		let id = WalletId::default();
		assert_eq!(id.network_global_id, MAINNET_GLOBAL_ID);
		assert_eq!(id.workchain, 0);
		assert_eq!(id.subwallet_number, 0);
		assert_eq!(id.wallet_version, WalletVersion::V5);
	}
}
