//!
//! Extension dictionary codec for the v5 wallet contract.
//!
//! The contract stores its authorized extensions as a `Hashmap 256 int8`:
//! the 8-bit value is the extension's workchain and the 256-bit key is the
//! extension address hash with its low 8 bits XOR-ed with `workchain + 1`.
//! The XOR keeps keys unique and the key dictionary balanced across
//! workchains; it must be reproduced exactly or decoded addresses are wrong.
//!
//! The codec is encapsulated behind an encode/decode pair with the invariant
//! `decode_extensions(encode_extensions(addrs)) == addrs` (ordered by key).
//! Label forms `hml_short`, `hml_long` and `hml_same` are all accepted when
//! decoding; encoding picks the shortest form and sorts entries by key, so
//! the output is deterministic.

use crate::wallet::types::WalletError;

use std::sync::Arc;
use tonlib_core::cell::{ArcCell, Cell, CellBuilder, CellParser};
use tonlib_core::{TonAddress, TonHash};

const KEY_BITS: usize = 256;

/// Number of bits used to store a length in `0..=n` (the TLB `#<= n` type)
fn len_bits(n: usize) -> usize {
	(usize::BITS - n.leading_zeros()) as usize
}

fn get_bit(key: &[u8; 32], index: usize) -> bool {
	(key[index / 8] >> (7 - index % 8)) & 1 == 1
}

fn bits_to_key(bits: &[bool]) -> [u8; 32] {
	let mut key = [0u8; 32];
	for (index, bit) in bits.iter().enumerate() {
		if *bit {
			key[index / 8] |= 1 << (7 - index % 8);
		}
	}
	key
}

fn xor_byte(workchain: i8) -> u8 {
	(workchain as i16 + 1) as u8
}

/// Dictionary key for an extension address: hash with low bits XOR (wc + 1)
pub fn extension_key(address: &TonAddress) -> [u8; 32] {
	let mut key: [u8; 32] = address.hash_part.into();
	key[31] ^= xor_byte(address.workchain as i8);
	key
}

/// Inverse of [`extension_key`]: recover the address from a dictionary entry
pub fn extension_address(key: &[u8; 32], workchain: i8) -> TonAddress {
	let mut hash = *key;
	hash[31] ^= xor_byte(workchain);
	TonAddress::new(workchain as i32, &TonHash::from(hash))
}

/// Encode a list of extension addresses into the dictionary root cell.
///
/// Returns `None` for an empty list — an empty `HashmapE` has no root node.
pub fn encode_extensions(addresses: &[TonAddress]) -> Result<Option<Cell>, WalletError> {
	if addresses.is_empty() {
		return Ok(None);
	}

	let mut entries: Vec<([u8; 32], i8)> = addresses
		.iter()
		.map(|address| (extension_key(address), address.workchain as i8))
		.collect();
	entries.sort_by(|a, b| a.0.cmp(&b.0));

	build_node(&entries, 0, KEY_BITS).map(Some)
}

/// Decode the dictionary root cell back into extension addresses, in key order
pub fn decode_extensions(dict: &ArcCell) -> Result<Vec<TonAddress>, WalletError> {
	let mut entries = Vec::new();
	let mut prefix = Vec::with_capacity(KEY_BITS);
	parse_node(dict, &mut prefix, KEY_BITS, &mut entries)?;

	Ok(entries
		.into_iter()
		.map(|(key, workchain)| extension_address(&key, workchain))
		.collect())
}

fn build_node(entries: &[([u8; 32], i8)], depth: usize, n: usize) -> Result<Cell, WalletError> {
	// All entries share key bits [0, depth); the label is their longest
	// common prefix from there.
	let first = &entries[0].0;
	let mut label_len = 0;
	while label_len < n {
		let bit = get_bit(first, depth + label_len);
		if entries
			.iter()
			.all(|(key, _)| get_bit(key, depth + label_len) == bit)
		{
			label_len += 1;
		} else {
			break;
		}
	}
	let label: Vec<bool> = (0..label_len)
		.map(|index| get_bit(first, depth + index))
		.collect();

	let mut builder = CellBuilder::new();
	store_label(&mut builder, &label, n)?;

	let m = n - label_len;
	if m == 0 {
		builder.store_u8(8, entries[0].1 as u8)?;
	} else {
		let split = entries.partition_point(|(key, _)| !get_bit(key, depth + label_len));
		let left = build_node(&entries[..split], depth + label_len + 1, m - 1)?;
		let right = build_node(&entries[split..], depth + label_len + 1, m - 1)?;
		builder.store_reference(&Arc::new(left))?;
		builder.store_reference(&Arc::new(right))?;
	}

	Ok(builder.build()?)
}

fn store_label(builder: &mut CellBuilder, label: &[bool], n: usize) -> Result<(), WalletError> {
	let len_bits_n = len_bits(n);
	let short_cost = 2 * label.len() + 2;
	let long_cost = 2 + len_bits_n + label.len();
	let same_allowed = label.len() > 1 && label.iter().all(|bit| *bit == label[0]);
	let same_cost = 3 + len_bits_n;

	if same_allowed && same_cost < short_cost && same_cost < long_cost {
		// hml_same$11 v:Bit n:(#<= m)
		builder.store_bit(true)?;
		builder.store_bit(true)?;
		builder.store_bit(label[0])?;
		store_len(builder, len_bits_n, label.len())?;
	} else if short_cost <= long_cost {
		// hml_short$0 len:(Unary ~n) s:(n * Bit)
		builder.store_bit(false)?;
		for _ in 0..label.len() {
			builder.store_bit(true)?;
		}
		builder.store_bit(false)?;
		for bit in label {
			builder.store_bit(*bit)?;
		}
	} else {
		// hml_long$10 n:(#<= m) s:(n * Bit)
		builder.store_bit(true)?;
		builder.store_bit(false)?;
		store_len(builder, len_bits_n, label.len())?;
		for bit in label {
			builder.store_bit(*bit)?;
		}
	}
	Ok(())
}

fn store_len(builder: &mut CellBuilder, bits: usize, value: usize) -> Result<(), WalletError> {
	if bits > 0 {
		builder.store_u32(bits, value as u32)?;
	}
	Ok(())
}

fn parse_node(
	cell: &ArcCell,
	prefix: &mut Vec<bool>,
	n: usize,
	entries: &mut Vec<([u8; 32], i8)>,
) -> Result<(), WalletError> {
	let mut parser = cell.parser();
	let label = parse_label(&mut parser, n)?;
	if label.len() > n {
		return Err(WalletError::InvalidExtensionDict(format!(
			"label of {} bits exceeds remaining key length {}",
			label.len(),
			n
		)));
	}

	let m = n - label.len();
	prefix.extend_from_slice(&label);

	if m == 0 {
		let value = parser.load_u8(8)? as i8;
		entries.push((bits_to_key(prefix), value));
	} else {
		let left = parser.next_reference()?;
		let right = parser.next_reference()?;

		prefix.push(false);
		parse_node(&left, prefix, m - 1, entries)?;
		prefix.pop();

		prefix.push(true);
		parse_node(&right, prefix, m - 1, entries)?;
		prefix.pop();
	}

	prefix.truncate(prefix.len() - label.len());
	Ok(())
}

fn parse_label(parser: &mut CellParser, n: usize) -> Result<Vec<bool>, WalletError> {
	let len_bits_n = len_bits(n);

	if !parser.load_bit()? {
		// hml_short: unary length, then the label bits
		let mut label_len = 0;
		while parser.load_bit()? {
			label_len += 1;
		}
		let mut label = Vec::with_capacity(label_len);
		for _ in 0..label_len {
			label.push(parser.load_bit()?);
		}
		Ok(label)
	} else if !parser.load_bit()? {
		// hml_long: explicit length, then the label bits
		let label_len = load_len(parser, len_bits_n)?;
		let mut label = Vec::with_capacity(label_len);
		for _ in 0..label_len {
			label.push(parser.load_bit()?);
		}
		Ok(label)
	} else {
		// hml_same: one bit repeated
		let bit = parser.load_bit()?;
		let label_len = load_len(parser, len_bits_n)?;
		Ok(vec![bit; label_len])
	}
}

fn load_len(parser: &mut CellParser, bits: usize) -> Result<usize, WalletError> {
	if bits == 0 {
		return Ok(0);
	}
	Ok(parser.load_u32(bits)? as usize)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(workchain: i32, fill: u8) -> TonAddress {
		let mut hash = [fill; 32];
		hash[0] = fill.wrapping_add(1);
		TonAddress::new(workchain, &TonHash::from(hash))
	}

	#[test]
	fn key_xors_low_bits_with_workchain_plus_one() {
		let base = addr(0, 0x42);
		let key = extension_key(&base);
		let base_hash: [u8; 32] = base.hash_part.into();
		// wc 0 -> XOR 1, only the lowest bit of the hash flips
		assert_eq!(key[31], base_hash[31] ^ 1);
		assert_eq!(&key[..31], &base_hash[..31]);

		// wc -1 -> XOR 0, key equals the hash
		let master = addr(-1, 0x42);
		let master_hash: [u8; 32] = master.hash_part.into();
		assert_eq!(extension_key(&master), master_hash);
	}

	#[test]
	fn key_round_trips_through_address() {
		for workchain in [-1i8, 0] {
			let address = addr(workchain as i32, 0xAB);
			let key = extension_key(&address);
			assert_eq!(extension_address(&key, workchain), address);
		}
	}

	#[test]
	fn empty_extension_list_has_no_dictionary() {
		assert!(encode_extensions(&[]).unwrap().is_none());
	}

	#[test]
	fn single_extension_round_trips() {
		let addresses = vec![addr(0, 0x17)];
		let dict = encode_extensions(&addresses).unwrap().unwrap();
		let decoded = decode_extensions(&Arc::new(dict)).unwrap();
		assert_eq!(decoded, addresses);
	}

	#[test]
	fn multiple_extensions_round_trip_across_workchains() {
		let addresses = vec![
			addr(0, 0x01),
			addr(0, 0xFE),
			addr(-1, 0x55),
			addr(0, 0x80),
			addr(-1, 0x02),
		];
		let dict = encode_extensions(&addresses).unwrap().unwrap();
		let mut decoded = decode_extensions(&Arc::new(dict)).unwrap();

		let mut expected = addresses.clone();
		expected.sort_by_key(|a| extension_key(a));
		decoded.sort_by_key(|a| extension_key(a));
		assert_eq!(decoded, expected);
	}

	#[test]
	fn decoding_is_ordered_by_key() {
		let addresses = vec![addr(0, 0x90), addr(0, 0x10), addr(0, 0x50)];
		let dict = encode_extensions(&addresses).unwrap().unwrap();
		let decoded = decode_extensions(&Arc::new(dict)).unwrap();

		let keys: Vec<[u8; 32]> = decoded.iter().map(extension_key).collect();
		let mut sorted = keys.clone();
		sorted.sort();
		assert_eq!(keys, sorted);
	}

	#[test]
	fn adjacent_keys_split_at_the_last_bit() {
		// Two keys differing only in the lowest bit force a maximal common
		// prefix and exercise the deep-split path.
		let mut hash_a = [0u8; 32];
		let mut hash_b = [0u8; 32];
		hash_a[31] = 0x02;
		hash_b[31] = 0x03;
		let addresses = vec![
			TonAddress::new(-1, &TonHash::from(hash_a)),
			TonAddress::new(-1, &TonHash::from(hash_b)),
		];
		let dict = encode_extensions(&addresses).unwrap().unwrap();
		let decoded = decode_extensions(&Arc::new(dict)).unwrap();
		assert_eq!(decoded.len(), 2);
		for address in &addresses {
			assert!(decoded.contains(address));
		}
	}
}
