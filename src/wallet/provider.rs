//!
//! Contract provider and external signer abstractions.
//!
//! The wallet helper never talks to the network itself; it goes through a
//! [`ContractProvider`] supplied by the caller, which knows how to read live
//! contract state, run read-only get methods, and submit external messages.
//! Signing may likewise be delegated to an [`ExternalSigner`] when the key
//! lives outside the process (e.g. a hardware signer).

use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use tonlib_core::cell::ArcCell;

/// Deployment status of a contract account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
	/// Deployed and running
	Active,
	/// No code deployed yet
	Uninitialized,
	/// Frozen due to storage fee debt
	Frozen,
}

/// Live state of a contract account
#[derive(Debug, Clone)]
pub struct ContractState {
	/// Balance in nanotons
	pub balance: BigUint,
	pub status: AccountStatus,
}

/// One entry of a TVM get-method result stack
#[derive(Debug, Clone)]
pub enum TvmStackEntry {
	Int(BigInt),
	Cell(ArcCell),
	Null,
}

/// Result stack of a read-only get-method call
#[derive(Debug, Clone)]
pub struct GetMethodResult {
	pub stack: Vec<TvmStackEntry>,
}

impl GetMethodResult {
	/// Read the stack entry at `index` as a number.
	///
	/// # Returns
	/// The integer value, or `ProviderError::InvalidStack` if the entry is
	/// missing, not an integer, or out of the i64 range.
	pub fn number(&self, index: usize) -> Result<i64, ProviderError> {
		match self.stack.get(index) {
			Some(TvmStackEntry::Int(value)) => i64::try_from(value.clone()).map_err(|_| {
				ProviderError::InvalidStack(format!("integer out of range at {index}: {value}"))
			}),
			Some(entry) => Err(ProviderError::InvalidStack(format!(
				"expected integer at {index}, got {entry:?}"
			))),
			None => Err(ProviderError::InvalidStack(format!(
				"missing stack entry at {index}"
			))),
		}
	}

	/// Read the stack entry at `index` as an optional cell (`Null` maps to `None`).
	pub fn cell_opt(&self, index: usize) -> Result<Option<ArcCell>, ProviderError> {
		match self.stack.get(index) {
			Some(TvmStackEntry::Cell(cell)) => Ok(Some(cell.clone())),
			Some(TvmStackEntry::Null) => Ok(None),
			Some(entry) => Err(ProviderError::InvalidStack(format!(
				"expected cell at {index}, got {entry:?}"
			))),
			None => Err(ProviderError::InvalidStack(format!(
				"missing stack entry at {index}"
			))),
		}
	}
}

/// Error types for contract provider operations.
///
/// These surface unchanged through the wallet helper — no retries, no
/// reclassification.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Get method {method} failed with exit code {exit_code}")]
	ExitCode { method: String, exit_code: i32 },

	#[error("Unexpected result stack: {0}")]
	InvalidStack(String),
}

/// Access to one contract account on the live network.
///
/// Implementations are expected to issue a single outbound call per method
/// and must not retry internally; cancellation is the caller's business.
#[async_trait]
pub trait ContractProvider: Send + Sync {
	/// Read the account state (balance and deployment status)
	async fn get_state(&self) -> Result<ContractState, ProviderError>;

	/// Run a read-only get method against the live contract
	async fn run_get_method(
		&self,
		method: &str,
		args: Vec<TvmStackEntry>,
	) -> Result<GetMethodResult, ProviderError>;

	/// Submit a BOC-serialized external message to the network
	async fn send_external(&self, boc: &[u8]) -> Result<(), ProviderError>;
}

/// A signer living outside the process.
///
/// Given the 32-byte hash of the request body cell, produces a 64-byte
/// ed25519 signature over it. The await point is the only suspension the
/// signed request path has.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
	async fn sign(&self, hash: &[u8]) -> Result<Vec<u8>, ProviderError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_numbers_and_cells_from_stack() {
		let result = GetMethodResult {
			stack: vec![TvmStackEntry::Int(BigInt::from(42)), TvmStackEntry::Null],
		};
		assert_eq!(result.number(0).unwrap(), 42);
		assert!(result.cell_opt(1).unwrap().is_none());
	}

	#[test]
	fn rejects_type_mismatches() {
		let result = GetMethodResult {
			stack: vec![TvmStackEntry::Null],
		};
		assert!(matches!(
			result.number(0),
			Err(ProviderError::InvalidStack(_))
		));
		assert!(matches!(
			result.number(1),
			Err(ProviderError::InvalidStack(_))
		));
	}
}
