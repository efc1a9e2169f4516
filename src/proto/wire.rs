use std::collections::BTreeMap;
use std::sync::Arc;

use crate::proto::message::DynamicMessage;
use crate::proto::schema::{FieldDescriptor, FieldShape, MessageDescriptor, ScalarKind, ValueKind};
use crate::proto::value::{MapKey, Value};
use crate::proto::{ProtoError, Result};

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_GROUP_START: u8 = 3;
const WIRE_GROUP_END: u8 = 4;
const WIRE_FIXED32: u8 = 5;

const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// Runtime limits for wire decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum recursive message nesting depth.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 32 }
	}
}

/// Decode a binary protobuf payload into a [`DynamicMessage`] of the given
/// type. Fields the schema does not declare are preserved verbatim in the
/// message's unknown payload.
pub fn decode_message(descriptor: &Arc<MessageDescriptor>, bytes: &[u8], options: &DecodeOptions) -> Result<DynamicMessage> {
	decode_message_impl(descriptor, bytes, options, 0)
}

fn decode_message_impl(descriptor: &Arc<MessageDescriptor>, bytes: &[u8], options: &DecodeOptions, depth: u32) -> Result<DynamicMessage> {
	if depth >= options.max_depth {
		return Err(ProtoError::DecodeDepthExceeded {
			max_depth: options.max_depth,
		});
	}

	let mut message = DynamicMessage::new(descriptor.clone());
	let mut unknown = Vec::new();
	let mut pos = 0_usize;

	while pos < bytes.len() {
		let field_start = pos;
		let (tag, after_tag) = read_varint(bytes, pos)?;
		let number = tag >> 3;
		if number == 0 || number > MAX_FIELD_NUMBER {
			return Err(ProtoError::WireInvalidTag { at: field_start });
		}
		let wire_type = (tag & 7) as u8;

		match descriptor.field_by_number(number as u32) {
			None => {
				let end = consume_field(bytes, field_start)?;
				unknown.extend_from_slice(&bytes[field_start..end]);
				pos = end;
			}
			Some(field) => {
				pos = decode_field(&mut message, field, wire_type, bytes, after_tag, options, depth)?;
			}
		}
	}

	if !unknown.is_empty() {
		message.set_unknown(unknown);
	}
	Ok(message)
}

fn decode_field(
	message: &mut DynamicMessage,
	field: &FieldDescriptor,
	wire_type: u8,
	bytes: &[u8],
	pos: usize,
	options: &DecodeOptions,
	depth: u32,
) -> Result<usize> {
	match &field.shape {
		FieldShape::Singular(ValueKind::Scalar(kind)) => {
			let (value, next) = decode_scalar(kind, wire_type, bytes, pos, &field.name)?;
			message.store(field.index, field.oneof, value);
			Ok(next)
		}
		FieldShape::Singular(ValueKind::Message(inner)) => {
			expect_wire(WIRE_LEN, wire_type, &field.name)?;
			let (payload, next) = read_len_delimited(bytes, pos)?;
			let nested = decode_message_impl(inner, payload, options, depth + 1)?;
			message.store(field.index, field.oneof, nested.into_value());
			Ok(next)
		}
		FieldShape::Repeated(ValueKind::Message(inner)) => {
			expect_wire(WIRE_LEN, wire_type, &field.name)?;
			let (payload, next) = read_len_delimited(bytes, pos)?;
			let nested = decode_message_impl(inner, payload, options, depth + 1)?;
			message.list_slot(field.index).push(nested.into_value());
			Ok(next)
		}
		FieldShape::Repeated(ValueKind::Scalar(kind)) => {
			if wire_type == WIRE_LEN && packable(kind) {
				let (payload, next) = read_len_delimited(bytes, pos)?;
				let mut inner_pos = 0_usize;
				while inner_pos < payload.len() {
					let (value, after_value) = decode_scalar_payload(kind, payload, inner_pos)?;
					message.list_slot(field.index).push(value);
					inner_pos = after_value;
				}
				Ok(next)
			} else {
				let (value, next) = decode_scalar(kind, wire_type, bytes, pos, &field.name)?;
				message.list_slot(field.index).push(value);
				Ok(next)
			}
		}
		FieldShape::Map { key, value } => {
			expect_wire(WIRE_LEN, wire_type, &field.name)?;
			let (payload, next) = read_len_delimited(bytes, pos)?;
			let (map_key, map_value) = decode_map_entry(key, value, payload, options, depth, &field.name)?;
			message.map_slot(field.index).insert(map_key, map_value);
			Ok(next)
		}
	}
}

// Map entries are key/value submessages on fields 1 and 2; either half may be
// absent and falls back to its default. An absent message value is an empty
// present message, not the nil record.
fn decode_map_entry(
	key_kind: &ScalarKind,
	value_kind: &ValueKind,
	payload: &[u8],
	options: &DecodeOptions,
	depth: u32,
	field_name: &str,
) -> Result<(MapKey, Value)> {
	let mut key_value = Value::default_of(key_kind);
	let mut value_slot = None;
	let mut pos = 0_usize;

	while pos < payload.len() {
		let entry_start = pos;
		let (tag, after_tag) = read_varint(payload, pos)?;
		let wire_type = (tag & 7) as u8;

		match tag >> 3 {
			1 => {
				let (value, next) = decode_scalar(key_kind, wire_type, payload, after_tag, field_name)?;
				key_value = value;
				pos = next;
			}
			2 => match value_kind {
				ValueKind::Scalar(kind) => {
					let (value, next) = decode_scalar(kind, wire_type, payload, after_tag, field_name)?;
					value_slot = Some(value);
					pos = next;
				}
				ValueKind::Message(inner) => {
					expect_wire(WIRE_LEN, wire_type, field_name)?;
					let (inner_payload, next) = read_len_delimited(payload, after_tag)?;
					let nested = decode_message_impl(inner, inner_payload, options, depth + 1)?;
					value_slot = Some(nested.into_value());
					pos = next;
				}
			},
			_ => {
				pos = consume_field(payload, entry_start)?;
			}
		}
	}

	let map_key = MapKey::from_value(&key_value).ok_or_else(|| ProtoError::MapKeyKindMismatch {
		field: field_name.to_owned(),
	})?;
	let map_value = match value_slot {
		Some(value) => value,
		None => match value_kind {
			ValueKind::Scalar(kind) => Value::default_of(kind),
			ValueKind::Message(inner) => DynamicMessage::new(inner.clone()).into_value(),
		},
	};
	Ok((map_key, map_value))
}

fn decode_scalar(kind: &ScalarKind, wire_type: u8, bytes: &[u8], pos: usize, field_name: &str) -> Result<(Value, usize)> {
	expect_wire(natural_wire_type(kind), wire_type, field_name)?;
	decode_scalar_payload(kind, bytes, pos)
}

fn decode_scalar_payload(kind: &ScalarKind, bytes: &[u8], pos: usize) -> Result<(Value, usize)> {
	match kind {
		ScalarKind::Bool => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::Bool(raw != 0), next))
		}
		ScalarKind::Int32 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::I64(i64::from(raw as i64 as i32)), next))
		}
		ScalarKind::Int64 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::I64(raw as i64), next))
		}
		ScalarKind::Sint32 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::I64(i64::from(decode_zigzag(raw) as i32)), next))
		}
		ScalarKind::Sint64 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::I64(decode_zigzag(raw)), next))
		}
		ScalarKind::Uint32 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::U64(u64::from(raw as u32)), next))
		}
		ScalarKind::Uint64 => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::U64(raw), next))
		}
		ScalarKind::Enum(_) => {
			let (raw, next) = read_varint(bytes, pos)?;
			Ok((Value::Enum(raw as i64 as i32), next))
		}
		ScalarKind::Fixed32 => {
			let (raw, next) = read_fixed32(bytes, pos)?;
			Ok((Value::U64(u64::from(raw)), next))
		}
		ScalarKind::Sfixed32 => {
			let (raw, next) = read_fixed32(bytes, pos)?;
			Ok((Value::I64(i64::from(raw as i32)), next))
		}
		ScalarKind::Float => {
			let (raw, next) = read_fixed32(bytes, pos)?;
			Ok((Value::F32(f32::from_bits(raw)), next))
		}
		ScalarKind::Fixed64 => {
			let (raw, next) = read_fixed64(bytes, pos)?;
			Ok((Value::U64(raw), next))
		}
		ScalarKind::Sfixed64 => {
			let (raw, next) = read_fixed64(bytes, pos)?;
			Ok((Value::I64(raw as i64), next))
		}
		ScalarKind::Double => {
			let (raw, next) = read_fixed64(bytes, pos)?;
			Ok((Value::F64(f64::from_bits(raw)), next))
		}
		ScalarKind::String => {
			let (payload, next) = read_len_delimited(bytes, pos)?;
			Ok((Value::String(String::from_utf8_lossy(payload).into_owned().into_boxed_str()), next))
		}
		ScalarKind::Bytes => {
			let (payload, next) = read_len_delimited(bytes, pos)?;
			Ok((Value::Bytes(payload.to_vec()), next))
		}
	}
}

fn natural_wire_type(kind: &ScalarKind) -> u8 {
	match kind {
		ScalarKind::Bool
		| ScalarKind::Int32
		| ScalarKind::Int64
		| ScalarKind::Sint32
		| ScalarKind::Sint64
		| ScalarKind::Uint32
		| ScalarKind::Uint64
		| ScalarKind::Enum(_) => WIRE_VARINT,
		ScalarKind::Fixed32 | ScalarKind::Sfixed32 | ScalarKind::Float => WIRE_FIXED32,
		ScalarKind::Fixed64 | ScalarKind::Sfixed64 | ScalarKind::Double => WIRE_FIXED64,
		ScalarKind::String | ScalarKind::Bytes => WIRE_LEN,
	}
}

fn packable(kind: &ScalarKind) -> bool {
	!matches!(kind, ScalarKind::String | ScalarKind::Bytes)
}

fn decode_zigzag(raw: u64) -> i64 {
	((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

fn expect_wire(expected: u8, got: u8, field_name: &str) -> Result<()> {
	if expected == got {
		return Ok(());
	}
	Err(ProtoError::WireUnexpectedType {
		field: field_name.to_owned(),
		wire_type: got,
	})
}

/// Group raw field bytes per field number, concatenating repeats.
pub(crate) fn group_unknown(bytes: &[u8]) -> Result<BTreeMap<u32, Vec<u8>>> {
	let mut groups: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
	let mut pos = 0_usize;
	while pos < bytes.len() {
		let (tag, _) = read_varint(bytes, pos)?;
		let number = tag >> 3;
		if number == 0 || number > MAX_FIELD_NUMBER {
			return Err(ProtoError::WireInvalidTag { at: pos });
		}
		let end = consume_field(bytes, pos)?;
		groups.entry(number as u32).or_default().extend_from_slice(&bytes[pos..end]);
		pos = end;
	}
	Ok(groups)
}

/// Return the end offset of the field whose tag starts at `start`, skipping
/// nested groups.
pub(crate) fn consume_field(bytes: &[u8], start: usize) -> Result<usize> {
	let (tag, pos) = read_varint(bytes, start)?;
	let number = tag >> 3;
	if number == 0 || number > MAX_FIELD_NUMBER {
		return Err(ProtoError::WireInvalidTag { at: start });
	}

	match (tag & 7) as u8 {
		WIRE_VARINT => {
			let (_, next) = read_varint(bytes, pos)?;
			Ok(next)
		}
		WIRE_FIXED64 => {
			let (_, next) = read_fixed64(bytes, pos)?;
			Ok(next)
		}
		WIRE_LEN => {
			let (_, next) = read_len_delimited(bytes, pos)?;
			Ok(next)
		}
		WIRE_GROUP_START => {
			let mut inner = pos;
			loop {
				if inner >= bytes.len() {
					return Err(ProtoError::WireTruncated { at: inner });
				}
				let (inner_tag, after_tag) = read_varint(bytes, inner)?;
				if (inner_tag & 7) as u8 == WIRE_GROUP_END {
					if inner_tag >> 3 == number {
						return Ok(after_tag);
					}
					return Err(ProtoError::WireUnmatchedGroupEnd { at: inner });
				}
				inner = consume_field(bytes, inner)?;
			}
		}
		WIRE_FIXED32 => {
			let (_, next) = read_fixed32(bytes, pos)?;
			Ok(next)
		}
		_ => Err(ProtoError::WireInvalidTag { at: start }),
	}
}

fn read_varint(bytes: &[u8], start: usize) -> Result<(u64, usize)> {
	let mut value = 0_u64;
	let mut shift = 0_u32;
	let mut pos = start;
	loop {
		let Some(byte) = bytes.get(pos) else {
			return Err(ProtoError::WireTruncated { at: pos });
		};
		if shift == 63 && *byte > 1 {
			return Err(ProtoError::WireVarintOverflow { at: start });
		}
		value |= u64::from(byte & 0x7f) << shift;
		pos += 1;
		if byte & 0x80 == 0 {
			return Ok((value, pos));
		}
		shift += 7;
		if shift > 63 {
			return Err(ProtoError::WireVarintOverflow { at: start });
		}
	}
}

fn read_fixed32(bytes: &[u8], pos: usize) -> Result<(u32, usize)> {
	let end = pos.saturating_add(4);
	let slice = bytes.get(pos..end).ok_or(ProtoError::WireTruncated { at: pos })?;
	let mut raw = [0_u8; 4];
	raw.copy_from_slice(slice);
	Ok((u32::from_le_bytes(raw), end))
}

fn read_fixed64(bytes: &[u8], pos: usize) -> Result<(u64, usize)> {
	let end = pos.saturating_add(8);
	let slice = bytes.get(pos..end).ok_or(ProtoError::WireTruncated { at: pos })?;
	let mut raw = [0_u8; 8];
	raw.copy_from_slice(slice);
	Ok((u64::from_le_bytes(raw), end))
}

fn read_len_delimited(bytes: &[u8], pos: usize) -> Result<(&[u8], usize)> {
	let (len, after_len) = read_varint(bytes, pos)?;
	let len = usize::try_from(len).map_err(|_| ProtoError::WireTruncated { at: pos })?;
	let end = after_len.checked_add(len).ok_or(ProtoError::WireTruncated { at: pos })?;
	let payload = bytes.get(after_len..end).ok_or(ProtoError::WireTruncated { at: after_len })?;
	Ok((payload, end))
}
