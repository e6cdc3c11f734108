//!
//! Request payload construction for the v5 wallet contract.
//!
//! A request body carries an auth opcode, the serialized wallet id, an
//! expiry, the seqno and the encoded action list; signed-auth bodies get a
//! 512-bit ed25519 signature over the body cell hash appended after the body
//! bits. Extension-authorized bodies carry the opcode and actions only — no
//! wallet id, no seqno, no signature.
//!
//! Send actions are encoded as a standard `OutList` reference chain
//! (`action_send_msg#0ec3c86d mode:uint8 out_msg:^MessageRelaxed`); extension
//! management actions go into a separate reference chain behind a
//! has-extended bit.

use crate::wallet::provider::ExternalSigner;
use crate::wallet::types::{
	ExternallySignedSendArgs, OutAction, SendMode, SignedAuthKind, SignedSendArgs, WalletError,
	WalletId,
};

use ed25519_dalek::Signer;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tonlib_core::TonAddress;
use tonlib_core::cell::{ArcCell, Cell, CellBuilder, TonCellError};

/// Auth opcode of an extension-authorized request ("extn")
pub const AUTH_EXTENSION: u32 = 0x6578746e;
/// Auth opcode of a signed request delivered externally ("sign")
pub const AUTH_SIGNED_EXTERNAL: u32 = 0x7369676e;
/// Auth opcode of a signed request delivered internally ("sint")
pub const AUTH_SIGNED_INTERNAL: u32 = 0x73696e74;

/// Action tag for sending an outbound message
pub const ACTION_SEND_MSG: u32 = 0x0ec3c86d;
/// Action tag for installing an extension
pub const ACTION_ADD_EXTENSION: u32 = 0x1c40db9f;
/// Action tag for removing an extension
pub const ACTION_REMOVE_EXTENSION: u32 = 0x5eaef4a4;

/// Request lifetime applied when no explicit expiry is given
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolve an optional absolute expiry to a concrete unix timestamp
pub fn resolve_valid_until(timeout: Option<u32>) -> u32 {
	timeout.unwrap_or_else(|| {
		let now = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default()
			.as_secs();
		(now + DEFAULT_TIMEOUT_SECS) as u32
	})
}

/// Serialize a wallet id into its 80-bit storage form
pub fn store_wallet_id(
	builder: &mut CellBuilder,
	wallet_id: &WalletId,
) -> Result<(), TonCellError> {
	builder.store_u32(32, wallet_id.network_global_id as u32)?;
	builder.store_u8(8, wallet_id.workchain as u8)?;
	builder.store_u8(8, wallet_id.wallet_version.code())?;
	builder.store_u32(32, wallet_id.subwallet_number)?;
	Ok(())
}

/// Build an extension-authorized request. No signing material is involved.
pub fn build_extension_request(
	actions: &[OutAction],
	default_mode: SendMode,
) -> Result<Cell, WalletError> {
	let mut builder = CellBuilder::new();
	builder.store_u32(32, AUTH_EXTENSION)?;
	store_out_actions(&mut builder, actions, default_mode)?;
	Ok(builder.build()?)
}

/// Build the unsigned body of a signed-auth request
pub fn build_signed_body(
	wallet_id: &WalletId,
	auth: SignedAuthKind,
	seqno: u32,
	valid_until: u32,
	actions: &[OutAction],
	default_mode: SendMode,
) -> Result<Cell, WalletError> {
	let opcode = match auth {
		SignedAuthKind::External => AUTH_SIGNED_EXTERNAL,
		SignedAuthKind::Internal => AUTH_SIGNED_INTERNAL,
	};

	let mut builder = CellBuilder::new();
	builder.store_u32(32, opcode)?;
	store_wallet_id(&mut builder, wallet_id)?;
	builder.store_u32(32, valid_until)?;
	builder.store_u32(32, seqno)?;
	store_out_actions(&mut builder, actions, default_mode)?;
	Ok(builder.build()?)
}

/// Append a 512-bit signature after the body bits
pub fn attach_signature(body: &Cell, signature: &[u8]) -> Result<Cell, WalletError> {
	if signature.len() != 64 {
		return Err(WalletError::Signature(format!(
			"expected a 64-byte signature, got {} bytes",
			signature.len()
		)));
	}
	let mut builder = CellBuilder::new();
	builder.store_cell(body)?;
	builder.store_slice(signature)?;
	Ok(builder.build()?)
}

/// Build and sign a request with a locally held secret key
pub fn sign_request(
	wallet_id: &WalletId,
	auth: SignedAuthKind,
	args: &SignedSendArgs,
	actions: &[OutAction],
	default_mode: SendMode,
) -> Result<Cell, WalletError> {
	let body = build_signed_body(
		wallet_id,
		auth,
		args.seqno,
		resolve_valid_until(args.timeout),
		actions,
		default_mode,
	)?;
	let hash = body.cell_hash();
	let signature = args.secret_key.sign(hash.as_slice()).to_bytes();
	attach_signature(&body, &signature)
}

/// Build a request and obtain its signature from an external signer.
///
/// The await on the signer is the only suspension point; ordering of
/// overlapping requests against the same seqno is the caller's business.
pub async fn sign_request_external(
	wallet_id: &WalletId,
	args: &ExternallySignedSendArgs,
	actions: &[OutAction],
	signer: &dyn ExternalSigner,
) -> Result<Cell, WalletError> {
	let body = build_signed_body(
		wallet_id,
		args.auth,
		args.seqno,
		resolve_valid_until(args.timeout),
		actions,
		args.send_mode.unwrap_or(SendMode::DEFAULT_TRANSFER),
	)?;
	let hash = body.cell_hash();
	let signature = signer.sign(hash.as_slice()).await?;
	attach_signature(&body, &signature)
}

fn store_out_actions(
	builder: &mut CellBuilder,
	actions: &[OutAction],
	default_mode: SendMode,
) -> Result<(), WalletError> {
	let mut send_list: ArcCell = Arc::new(CellBuilder::new().build()?);
	let mut send_count = 0usize;
	for action in actions {
		if let OutAction::SendMsg { mode, message } = action {
			let mut node = CellBuilder::new();
			node.store_reference(&send_list)?;
			node.store_u32(32, ACTION_SEND_MSG)?;
			node.store_u8(8, mode.unwrap_or(default_mode).bits())?;
			node.store_reference(message)?;
			send_list = Arc::new(node.build()?);
			send_count += 1;
		}
	}

	if send_count == 0 {
		builder.store_bit(false)?;
	} else {
		builder.store_bit(true)?;
		builder.store_reference(&send_list)?;
	}

	let extended: Vec<(u32, &TonAddress)> = actions
		.iter()
		.filter_map(|action| match action {
			OutAction::AddExtension { address } => Some((ACTION_ADD_EXTENSION, address)),
			OutAction::RemoveExtension { address } => Some((ACTION_REMOVE_EXTENSION, address)),
			OutAction::SendMsg { .. } => None,
		})
		.collect();

	if extended.is_empty() {
		builder.store_bit(false)?;
		return Ok(());
	}

	let mut next: Option<ArcCell> = None;
	for (opcode, address) in extended.iter().rev() {
		let mut node = CellBuilder::new();
		node.store_u32(32, *opcode)?;
		node.store_address(address)?;
		match &next {
			Some(tail) => {
				node.store_bit(true)?;
				node.store_reference(tail)?;
			}
			None => {
				node.store_bit(false)?;
			}
		}
		next = Some(Arc::new(node.build()?));
	}

	builder.store_bit(true)?;
	// chain head carries the first extended action in input order
	builder.store_reference(&next.expect("non-empty extended action chain"))?;
	Ok(())
}
