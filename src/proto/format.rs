use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use crate::proto::diff::NIL_TEXT;
use crate::proto::message::MessageView;
use crate::proto::schema::{FieldDescriptor, FieldShape, ScalarKind, ValueKind};
use crate::proto::sort::sorted_entries;
use crate::proto::value::{MapKey, Value};

/// Render a message in canonical single-line form: `<field:value ...>` with
/// only set fields, in declared order, oneof groups collapsed to their active
/// member. Deterministic for a given logical value regardless of map
/// construction order.
pub fn format_message(message: &dyn MessageView) -> String {
	let mut out = String::new();
	write_message(&mut out, message);
	out
}

/// Render a field value according to its declared shape.
pub(crate) fn format_field(value: &Value, field: &FieldDescriptor) -> String {
	let mut out = String::new();
	write_field(&mut out, value, field);
	out
}

/// Render a singular value according to its declared kind.
pub(crate) fn format_value(value: &Value, kind: &ValueKind) -> String {
	let mut out = String::new();
	write_value(&mut out, value, kind);
	out
}

/// Render a scalar value according to its declared scalar kind.
pub(crate) fn format_scalar(value: &Value, kind: &ScalarKind) -> String {
	let mut out = String::new();
	write_scalar(&mut out, value, kind);
	out
}

/// Render bytes as a bracketed decimal list: `[1 2]`.
pub(crate) fn format_bytes(bytes: &[u8]) -> String {
	let mut out = String::new();
	write_bytes(&mut out, bytes);
	out
}

/// Render unknown-field byte groupings per field number, ascending.
pub(crate) fn format_unknown_groups(groups: &BTreeMap<u32, Vec<u8>>) -> String {
	let mut out = String::new();
	out.push_str("map[");
	for (position, (number, bytes)) in groups.iter().enumerate() {
		if position > 0 {
			out.push(' ');
		}
		let _ = write!(out, "{number}:");
		write_bytes(&mut out, bytes);
	}
	out.push(']');
	out
}

fn write_message(out: &mut String, message: &dyn MessageView) {
	out.push('<');
	for (position, (field, value)) in message.set_fields().iter().enumerate() {
		if position > 0 {
			out.push(' ');
		}
		out.push_str(&field.name);
		out.push(':');
		write_field(out, value, field);
	}
	out.push('>');
}

fn write_field(out: &mut String, value: &Value, field: &FieldDescriptor) {
	match &field.shape {
		FieldShape::Singular(kind) => write_value(out, value, kind),
		FieldShape::Repeated(kind) => match value {
			Value::List(items) => write_list(out, items, kind),
			other => out.push_str(other.kind_name()),
		},
		FieldShape::Map { value: value_kind, .. } => match value {
			Value::Map(entries) => write_map(out, entries, value_kind),
			other => out.push_str(other.kind_name()),
		},
	}
}

fn write_list(out: &mut String, items: &[Value], kind: &ValueKind) {
	out.push('[');
	for (position, item) in items.iter().enumerate() {
		if position > 0 {
			out.push(' ');
		}
		write_value(out, item, kind);
	}
	out.push(']');
}

fn write_map(out: &mut String, entries: &HashMap<MapKey, Value>, value_kind: &ValueKind) {
	out.push_str("map[");
	for (position, (key, value)) in sorted_entries(entries).iter().enumerate() {
		if position > 0 {
			out.push(' ');
		}
		let _ = write!(out, "{key}:");
		write_value(out, value, value_kind);
	}
	out.push(']');
}

fn write_value(out: &mut String, value: &Value, kind: &ValueKind) {
	match kind {
		ValueKind::Scalar(scalar) => write_scalar(out, value, scalar),
		ValueKind::Message(_) => match value {
			Value::Message(Some(nested)) => write_message(out, nested.as_ref()),
			Value::Message(None) => out.push_str(NIL_TEXT),
			other => out.push_str(other.kind_name()),
		},
	}
}

fn write_scalar(out: &mut String, value: &Value, kind: &ScalarKind) {
	match (kind, value) {
		(ScalarKind::String, Value::String(text)) => {
			let _ = write!(out, "{text:?}");
		}
		(ScalarKind::Bytes, Value::Bytes(bytes)) => write_bytes(out, bytes),
		(ScalarKind::Enum(descriptor), Value::Enum(number)) => match descriptor.symbol(*number) {
			Some(symbol) => out.push_str(symbol),
			None => {
				let _ = write!(out, "{number}");
			}
		},
		(_, Value::Bool(inner)) => {
			let _ = write!(out, "{inner}");
		}
		(_, Value::I64(inner)) => {
			let _ = write!(out, "{inner}");
		}
		(_, Value::U64(inner)) => {
			let _ = write!(out, "{inner}");
		}
		(_, Value::F32(inner)) => {
			let _ = write!(out, "{inner}");
		}
		(_, Value::F64(inner)) => {
			let _ = write!(out, "{inner}");
		}
		(_, other) => out.push_str(other.kind_name()),
	}
}

fn write_bytes(out: &mut String, bytes: &[u8]) {
	out.push('[');
	for (position, byte) in bytes.iter().enumerate() {
		if position > 0 {
			out.push(' ');
		}
		let _ = write!(out, "{byte}");
	}
	out.push(']');
}

#[cfg(test)]
mod tests {
	use std::collections::{BTreeMap, HashMap};

	use super::{format_bytes, format_message, format_unknown_groups};
	use crate::proto::message::DynamicMessage;
	use crate::proto::schema::{EnumDescriptor, FieldDescriptor, MessageDescriptor, ScalarKind, ValueKind};
	use crate::proto::value::{MapKey, Value};

	#[test]
	fn message_renders_set_fields_in_declared_order() {
		let status = EnumDescriptor::new("Status", &[("OK", 0), ("NOT_OK", 1)]);
		let descriptor = MessageDescriptor::new(
			"Sample",
			vec![
				FieldDescriptor::singular(1, "name", ValueKind::Scalar(ScalarKind::String)),
				FieldDescriptor::singular(2, "count", ValueKind::Scalar(ScalarKind::Int64)),
				FieldDescriptor::singular(3, "status", ValueKind::Scalar(ScalarKind::Enum(status))),
				FieldDescriptor::singular(4, "payload", ValueKind::Scalar(ScalarKind::Bytes)),
			],
			&[],
		)
		.expect("descriptor builds");

		let mut message = DynamicMessage::new(descriptor);
		message.set("status", Value::Enum(1)).expect("set succeeds");
		message.set("name", Value::String("foo".into())).expect("set succeeds");
		message.set("count", Value::I64(42)).expect("set succeeds");
		message.set("payload", Value::Bytes(vec![1, 2])).expect("set succeeds");

		assert_eq!(format_message(&message), "<name:\"foo\" count:42 status:NOT_OK payload:[1 2]>");
	}

	#[test]
	fn unknown_enum_number_falls_back_to_ordinal() {
		let status = EnumDescriptor::new("Status", &[("OK", 0)]);
		let descriptor = MessageDescriptor::new(
			"Sample",
			vec![FieldDescriptor::singular(1, "status", ValueKind::Scalar(ScalarKind::Enum(status)))],
			&[],
		)
		.expect("descriptor builds");

		let mut message = DynamicMessage::new(descriptor);
		message.set("status", Value::Enum(7)).expect("set succeeds");
		assert_eq!(format_message(&message), "<status:7>");
	}

	#[test]
	fn map_entries_render_in_sorted_key_order() {
		let descriptor = MessageDescriptor::new(
			"Sample",
			vec![FieldDescriptor::map(1, "scores", ScalarKind::String, ValueKind::Scalar(ScalarKind::Int64))],
			&[],
		)
		.expect("descriptor builds");

		let mut message = DynamicMessage::new(descriptor);
		message
			.set(
				"scores",
				Value::Map(HashMap::from([
					(MapKey::String("B".into()), Value::I64(30)),
					(MapKey::String("A".into()), Value::I64(20)),
					(MapKey::String("C".into()), Value::I64(40)),
				])),
			)
			.expect("set succeeds");

		assert_eq!(format_message(&message), "<scores:map[A:20 B:30 C:40]>");
	}

	#[test]
	fn nested_absent_message_renders_nil_marker() {
		let inner = MessageDescriptor::new(
			"Inner",
			vec![FieldDescriptor::singular(1, "id", ValueKind::Scalar(ScalarKind::String))],
			&[],
		)
		.expect("descriptor builds");
		let descriptor = MessageDescriptor::new(
			"Outer",
			vec![FieldDescriptor::repeated(1, "items", ValueKind::Message(inner.clone()))],
			&[],
		)
		.expect("descriptor builds");

		let mut first = DynamicMessage::new(inner);
		first.set("id", Value::String("1".into())).expect("set succeeds");

		let mut message = DynamicMessage::new(descriptor);
		message
			.set("items", Value::List(vec![first.into_value(), Value::Message(None)]))
			.expect("set succeeds");

		assert_eq!(format_message(&message), "<items:[<id:\"1\"> <nil>]>");
	}

	#[test]
	fn string_rendering_escapes_quotes_and_newlines() {
		let descriptor = MessageDescriptor::new(
			"Sample",
			vec![FieldDescriptor::singular(1, "text", ValueKind::Scalar(ScalarKind::String))],
			&[],
		)
		.expect("descriptor builds");

		let mut message = DynamicMessage::new(descriptor);
		message.set("text", Value::String("a\"b\nc".into())).expect("set succeeds");
		assert_eq!(format_message(&message), "<text:\"a\\\"b\\nc\">");
	}

	#[test]
	fn unknown_groups_render_ascending_by_field_number() {
		let groups = BTreeMap::from([(5, vec![42, 0]), (1, vec![8, 150, 1])]);
		assert_eq!(format_unknown_groups(&groups), "map[1:[8 150 1] 5:[42 0]]");
		assert_eq!(format_bytes(&[]), "[]");
	}
}
