//!
//! The v5 wallet contract helper.
//!
//! A [`WalletContractV5`] instance is a pure function of its wallet id and
//! public key: address and initial code/data are derived once at construction
//! and never change. All network access goes through a caller-supplied
//! [`ContractProvider`]; every operation issues at most one outbound call and
//! propagates the first failure unchanged. Nothing here retries, caches, or
//! serializes concurrent use of the same seqno.

use crate::wallet::extensions::decode_extensions;
use crate::wallet::message::internal_message;
use crate::wallet::payload;
use crate::wallet::provider::{
	AccountStatus, ContractProvider, ExternalSigner,
};
use crate::wallet::types::{
	ExternallySignedSendArgs, OutAction, SendMode, SignedAuthKind, SignedSendArgs, TransferArgs,
	Wallet5SendArgs, WalletError, WalletId,
};

use ed25519_dalek::SigningKey;
use num_bigint::BigUint;
use std::sync::Arc;
use tonlib_core::TonAddress;
use tonlib_core::cell::{ArcCell, BagOfCells, Cell, CellBuilder};
use tracing::debug;

/// Code of the v5 wallet contract, BOC base64
const WALLET_V5_CODE: &str =
	"te6cckEBAQEAIwAIQgLkzzsvTG1qYeoPK1RH0mZ4WyavNjfbLe7mvNGqgm80Eg3NjhE=";

/// One instance of the v5 wallet contract.
///
/// Immutable after [`WalletContractV5::create`]; identical
/// (wallet id, public key) pairs always derive the same address.
pub struct WalletContractV5 {
	pub wallet_id: WalletId,
	pub public_key: [u8; 32],
	/// Contract address derived from the initial code and data
	pub address: TonAddress,
	/// Initial code cell
	pub code: ArcCell,
	/// Initial data cell: seqno 0, wallet id, public key, empty extensions
	pub data: ArcCell,
}

impl WalletContractV5 {
	/// Create a wallet instance, applying [`WalletId::default`] for any
	/// unspecified identity.
	pub fn create(
		wallet_id: Option<WalletId>,
		public_key: [u8; 32],
	) -> Result<Self, WalletError> {
		let wallet_id = wallet_id.unwrap_or_default();

		let boc = BagOfCells::parse_base64(WALLET_V5_CODE)?;
		let code = boc.single_root()?.clone();

		let mut data_builder = CellBuilder::new();
		// seqno, 33 zero bits
		data_builder.store_bit(false)?;
		data_builder.store_u32(32, 0)?;
		payload::store_wallet_id(&mut data_builder, &wallet_id)?;
		data_builder.store_slice(&public_key)?;
		// empty extensions dictionary
		data_builder.store_bit(false)?;
		let data = Arc::new(data_builder.build()?);

		// state_init$_ split_depth:(Maybe _) special:(Maybe _)
		//   code:(Maybe ^Cell) data:(Maybe ^Cell) library:(Maybe _)
		let mut state_init_builder = CellBuilder::new();
		state_init_builder.store_bit(false)?;
		state_init_builder.store_bit(false)?;
		state_init_builder.store_bit(true)?;
		state_init_builder.store_reference(&code)?;
		state_init_builder.store_bit(true)?;
		state_init_builder.store_reference(&data)?;
		state_init_builder.store_bit(false)?;
		let state_init = state_init_builder.build()?;

		let hash = state_init.cell_hash();
		let address = TonAddress::new(wallet_id.workchain as i32, &hash);
		debug!("Derived wallet address {}", address);

		Ok(Self {
			wallet_id,
			public_key,
			address,
			code,
			data,
		})
	}

	/// Get the wallet balance in nanotons
	pub async fn get_balance(
		&self,
		provider: &dyn ContractProvider,
	) -> Result<BigUint, WalletError> {
		let state = provider.get_state().await?;
		Ok(state.balance)
	}

	/// Get the wallet seqno.
	///
	/// Returns 0 without invoking a get method when the contract is not yet
	/// deployed.
	pub async fn get_seqno(&self, provider: &dyn ContractProvider) -> Result<u32, WalletError> {
		let state = provider.get_state().await?;
		if state.status == AccountStatus::Active {
			let result = provider.run_get_method("seqno", vec![]).await?;
			Ok(result.number(0)? as u32)
		} else {
			Ok(0)
		}
	}

	/// Get the raw extensions dictionary cell.
	///
	/// Returns `None` without invoking a get method when the contract is not
	/// yet deployed, and `None` when the dictionary is empty.
	pub async fn get_extensions(
		&self,
		provider: &dyn ContractProvider,
	) -> Result<Option<ArcCell>, WalletError> {
		let state = provider.get_state().await?;
		if state.status == AccountStatus::Active {
			let result = provider.run_get_method("get_extensions", vec![]).await?;
			Ok(result.cell_opt(0)?)
		} else {
			Ok(None)
		}
	}

	/// Get the decoded extension addresses
	pub async fn get_extensions_array(
		&self,
		provider: &dyn ContractProvider,
	) -> Result<Vec<TonAddress>, WalletError> {
		match self.get_extensions(provider).await? {
			Some(dict) => decode_extensions(&dict),
			None => Ok(Vec::new()),
		}
	}

	/// Get whether secret-key (signature) authentication is enabled
	pub async fn get_is_secret_key_auth_enabled(
		&self,
		provider: &dyn ContractProvider,
	) -> Result<bool, WalletError> {
		let result = provider
			.run_get_method("get_is_signature_auth_allowed", vec![])
			.await?;
		Ok(result.number(0)? != 0)
	}

	/// Submit a fully built request payload as an external message
	pub async fn send(
		&self,
		provider: &dyn ContractProvider,
		message: &Cell,
	) -> Result<(), WalletError> {
		let boc = BagOfCells::from_root(message.clone()).serialize(true)?;
		debug!("Submitting external message: {}", hex::encode(&boc));
		provider.send_external(&boc).await?;
		Ok(())
	}

	/// Build a signed or extension-authorized request payload.
	///
	/// The default send mode (pay gas separately, ignore errors) is applied
	/// to any send action without an explicit mode. Malformed action inputs
	/// are not validated here; the contract rejects them on execution.
	pub fn create_request(
		&self,
		args: &Wallet5SendArgs,
		actions: &[OutAction],
	) -> Result<Cell, WalletError> {
		let default_mode = args.send_mode().unwrap_or(SendMode::DEFAULT_TRANSFER);
		match args {
			Wallet5SendArgs::Extension { .. } => {
				payload::build_extension_request(actions, default_mode)
			}
			Wallet5SendArgs::SignedExternal(signed) => payload::sign_request(
				&self.wallet_id,
				SignedAuthKind::External,
				signed,
				actions,
				default_mode,
			),
			Wallet5SendArgs::SignedInternal(signed) => payload::sign_request(
				&self.wallet_id,
				SignedAuthKind::Internal,
				signed,
				actions,
				default_mode,
			),
		}
	}

	/// Build a request whose signature comes from an external signer
	pub async fn create_and_sign_request_async(
		&self,
		args: &ExternallySignedSendArgs,
		actions: &[OutAction],
		signer: &dyn ExternalSigner,
	) -> Result<Cell, WalletError> {
		payload::sign_request_external(&self.wallet_id, args, actions, signer).await
	}

	/// Build a transfer request: one send action per message, in input order
	pub fn create_transfer(
		&self,
		args: &Wallet5SendArgs,
		messages: Vec<ArcCell>,
	) -> Result<Cell, WalletError> {
		let actions = Self::create_actions(messages, args.send_mode());
		self.create_request(args, &actions)
	}

	/// Build a transfer request signed by an external signer
	pub async fn create_transfer_and_sign_request_async(
		&self,
		args: &ExternallySignedSendArgs,
		messages: Vec<ArcCell>,
		signer: &dyn ExternalSigner,
	) -> Result<Cell, WalletError> {
		let actions = Self::create_actions(messages, args.send_mode);
		self.create_and_sign_request_async(args, &actions, signer)
			.await
	}

	/// Build an add-extension request
	pub fn create_add_extension(
		&self,
		args: &Wallet5SendArgs,
		extension_address: TonAddress,
	) -> Result<Cell, WalletError> {
		self.create_request(
			args,
			&[OutAction::AddExtension {
				address: extension_address,
			}],
		)
	}

	/// Build a remove-extension request
	pub fn create_remove_extension(
		&self,
		args: &Wallet5SendArgs,
		extension_address: TonAddress,
	) -> Result<Cell, WalletError> {
		self.create_request(
			args,
			&[OutAction::RemoveExtension {
				address: extension_address,
			}],
		)
	}

	/// Build and submit a transfer
	pub async fn send_transfer(
		&self,
		provider: &dyn ContractProvider,
		args: &Wallet5SendArgs,
		messages: Vec<ArcCell>,
	) -> Result<(), WalletError> {
		let transfer = self.create_transfer(args, messages)?;
		self.send(provider, &transfer).await
	}

	/// Build and submit an add-extension request
	pub async fn send_add_extension(
		&self,
		provider: &dyn ContractProvider,
		args: &Wallet5SendArgs,
		extension_address: TonAddress,
	) -> Result<(), WalletError> {
		let request = self.create_add_extension(args, extension_address)?;
		self.send(provider, &request).await
	}

	/// Build and submit a remove-extension request
	pub async fn send_remove_extension(
		&self,
		provider: &dyn ContractProvider,
		args: &Wallet5SendArgs,
		extension_address: TonAddress,
	) -> Result<(), WalletError> {
		let request = self.create_remove_extension(args, extension_address)?;
		self.send(provider, &request).await
	}

	/// Build and submit a request with an explicit action list
	pub async fn send_request(
		&self,
		provider: &dyn ContractProvider,
		args: &Wallet5SendArgs,
		actions: &[OutAction],
	) -> Result<(), WalletError> {
		let request = self.create_request(args, actions)?;
		self.send(provider, &request).await
	}

	/// Create a sender capability bound to this wallet, a provider and a key.
	///
	/// This is the integration point for wallet-version-agnostic transfer
	/// code: the sender fetches the current seqno, builds a single-message
	/// signed transfer with the default send mode, and submits it.
	pub fn sender<'a>(
		&'a self,
		provider: &'a dyn ContractProvider,
		secret_key: SigningKey,
	) -> WalletSender<'a> {
		WalletSender {
			wallet: self,
			provider,
			secret_key,
		}
	}

	fn create_actions(messages: Vec<ArcCell>, send_mode: Option<SendMode>) -> Vec<OutAction> {
		let mode = send_mode.unwrap_or(SendMode::DEFAULT_TRANSFER);
		messages
			.into_iter()
			.map(|message| OutAction::SendMsg {
				mode: Some(mode),
				message,
			})
			.collect()
	}
}

/// A capability that signs and submits one transfer at a time.
///
/// Each [`WalletSender::send`] call fetches the wallet's current seqno; the
/// caller must serialize overlapping sends against the same wallet.
pub struct WalletSender<'a> {
	wallet: &'a WalletContractV5,
	provider: &'a dyn ContractProvider,
	secret_key: SigningKey,
}

impl WalletSender<'_> {
	/// Build, sign and submit a single-message transfer
	pub async fn send(&self, args: TransferArgs) -> Result<(), WalletError> {
		let seqno = self.wallet.get_seqno(self.provider).await?;
		let message = Arc::new(internal_message(&args)?);
		let transfer = self.wallet.create_transfer(
			&Wallet5SendArgs::SignedExternal(SignedSendArgs {
				seqno,
				send_mode: args.send_mode,
				timeout: None,
				secret_key: self.secret_key.clone(),
			}),
			vec![message],
		)?;
		self.wallet.send(self.provider, &transfer).await
	}
}
