//! Internal (relaxed) message construction for the sender path

use crate::wallet::types::TransferArgs;

use num_bigint::BigUint;
use tonlib_core::cell::{Cell, CellBuilder, TonCellError};

/// Build a relaxed internal message cell from a minimal transfer description.
///
/// The source address is left empty (`addr_none`) and fees, logical time and
/// creation time are zeroed — the network fills them in on delivery. State
/// init and body, when present, are attached as references.
pub fn internal_message(args: &TransferArgs) -> Result<Cell, TonCellError> {
	let mut builder = CellBuilder::new();
	// int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
	builder.store_bit(false)?;
	builder.store_bit(true)?;
	builder.store_bit(args.bounce)?;
	builder.store_bit(false)?;
	// src:MsgAddress = addr_none$00
	builder.store_u8(2, 0)?;
	builder.store_address(&args.to)?;
	builder.store_coins(&args.value)?;
	// no extra currencies
	builder.store_bit(false)?;
	builder.store_coins(&BigUint::from(0u8))?;
	builder.store_coins(&BigUint::from(0u8))?;
	builder.store_u64(64, 0)?;
	builder.store_u32(32, 0)?;
	// init:(Maybe (Either StateInit ^StateInit))
	match &args.state_init {
		Some(init) => {
			builder.store_bit(true)?;
			builder.store_bit(true)?;
			builder.store_reference(init)?;
		}
		None => {
			builder.store_bit(false)?;
		}
	}
	// body:(Either X ^X)
	match &args.body {
		Some(body) => {
			builder.store_bit(true)?;
			builder.store_reference(body)?;
		}
		None => {
			builder.store_bit(false)?;
		}
	}
	builder.build()
}

#[cfg(test)]
mod tests {
	use super::*;
	use tonlib_core::{TonAddress, TonHash};

	#[test]
	fn internal_message_round_trips_dest_value_and_bounce() {
		let to = TonAddress::new(0, &TonHash::from([0x33; 32]));
		let message = internal_message(&TransferArgs {
			to: to.clone(),
			value: BigUint::from(1_500_000_000u64),
			bounce: true,
			body: None,
			state_init: None,
			send_mode: None,
		})
		.expect("Failed to build message");

		let mut parser = message.parser();
		assert!(!parser.load_bit().unwrap()); // int_msg_info$0
		assert!(parser.load_bit().unwrap()); // ihr_disabled
		assert!(parser.load_bit().unwrap()); // bounce
		assert!(!parser.load_bit().unwrap()); // bounced
		assert_eq!(parser.load_u8(2).unwrap(), 0); // addr_none src
		assert_eq!(parser.load_address().unwrap(), to);
		assert_eq!(parser.load_coins().unwrap(), BigUint::from(1_500_000_000u64));
	}

	#[test]
	fn body_is_attached_as_a_reference() {
		let mut body_builder = CellBuilder::new();
		body_builder.store_u32(32, 0).unwrap();
		let body = std::sync::Arc::new(body_builder.build().unwrap());

		let message = internal_message(&TransferArgs {
			to: TonAddress::new(0, &TonHash::from([0x44; 32])),
			value: BigUint::from(1u8),
			bounce: false,
			body: Some(body.clone()),
			state_init: None,
			send_mode: None,
		})
		.expect("Failed to build message");

		let mut parser = message.parser();
		// skip to the init/body flags: 4 tag bits + src + dest + value + extra
		// currencies + fees + lt + time
		parser.load_bit().unwrap();
		parser.load_bit().unwrap();
		parser.load_bit().unwrap();
		parser.load_bit().unwrap();
		parser.load_u8(2).unwrap();
		parser.load_address().unwrap();
		parser.load_coins().unwrap();
		parser.load_bit().unwrap();
		parser.load_coins().unwrap();
		parser.load_coins().unwrap();
		parser.load_u64(64).unwrap();
		parser.load_u32(32).unwrap();

		assert!(!parser.load_bit().unwrap()); // no state init
		assert!(parser.load_bit().unwrap()); // body in reference
		let parsed_body = parser.next_reference().unwrap();
		assert_eq!(parsed_body.cell_hash(), body.cell_hash());
	}
}
