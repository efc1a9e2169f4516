use std::collections::HashMap;
use std::sync::Arc;

use crate::proto::diff::{Diff, MismatchKind, NIL_TEXT};
use crate::proto::format::{format_bytes, format_field, format_message, format_scalar, format_unknown_groups};
use crate::proto::message::MessageView;
use crate::proto::schema::{FieldDescriptor, FieldShape, ScalarKind, ValueKind};
use crate::proto::value::{MapKey, Value};
use crate::proto::wire;

/// Compare two messages, reporting the first divergence or `None` on equality.
///
/// `None` on either side is the absent record, distinct from an empty present
/// one; both absent compare equal. Messages must share one schema identity —
/// a comparison across descriptors reports [`MismatchKind::Descriptor`] and is
/// not meaningful beyond that.
pub fn equal(expected: Option<&dyn MessageView>, actual: Option<&dyn MessageView>) -> Option<Diff> {
	match (expected, actual) {
		(None, None) => None,
		(Some(mx), None) => Some(
			Diff::new(MismatchKind::Value)
				.values(format_message(mx), NIL_TEXT.to_owned())
				.segment(mx.descriptor().name.to_string()),
		),
		(None, Some(my)) => Some(
			Diff::new(MismatchKind::Value)
				.values(NIL_TEXT.to_owned(), format_message(my))
				.segment(my.descriptor().name.to_string()),
		),
		(Some(mx), Some(my)) => equal_message(mx, my),
	}
}

fn equal_message(mx: &dyn MessageView, my: &dyn MessageView) -> Option<Diff> {
	if !Arc::ptr_eq(mx.descriptor(), my.descriptor()) {
		return Some(Diff::new(MismatchKind::Descriptor));
	}

	for (field, vx) in mx.set_fields() {
		if !my.has(field) {
			return Some(missing_field(field, &vx, &my.get(field)));
		}
		let vy = my.get(field);
		if let Some(diff) = equal_field(field, &vx, &vy) {
			return Some(diff);
		}
	}

	for (field, vy) in my.set_fields() {
		if !mx.has(field) {
			return Some(missing_field(field, &vy, &mx.get(field)).swap());
		}
	}

	equal_unknown(mx.unknown(), my.unknown())
}

// Expected text is the formatted present side; the absent side renders a
// kind-appropriate marker: quoted empty string for strings, the nil marker for
// lists/maps/messages, the raw unset default otherwise.
fn missing_field(field: &FieldDescriptor, present: &Value, unset: &Value) -> Diff {
	let expected = format_field(present, field);
	let actual = match &field.shape {
		FieldShape::Repeated(_) | FieldShape::Map { .. } => NIL_TEXT.to_owned(),
		FieldShape::Singular(ValueKind::Message(_)) => NIL_TEXT.to_owned(),
		FieldShape::Singular(_) => format_field(unset, field),
	};
	Diff::new(MismatchKind::Value).values(expected, actual).segment(field.name.to_string())
}

fn equal_field(field: &FieldDescriptor, vx: &Value, vy: &Value) -> Option<Diff> {
	let diff = match &field.shape {
		FieldShape::Repeated(kind) => match (vx, vy) {
			(Value::List(x), Value::List(y)) => equal_list(kind, x, y),
			_ => Some(Diff::new(MismatchKind::Value).values(format_field(vx, field), format_field(vy, field))),
		},
		FieldShape::Map { value, .. } => match (vx, vy) {
			(Value::Map(x), Value::Map(y)) => equal_map(value, x, y),
			_ => Some(Diff::new(MismatchKind::Value).values(format_field(vx, field), format_field(vy, field))),
		},
		FieldShape::Singular(kind) => equal_value(kind, vx, vy),
	};
	diff.map(|diff| diff.segment(field.name.to_string()))
}

// Elements are scanned from the last index down: for lists sharing a stable
// prefix this surfaces the last point of divergence.
fn equal_list(kind: &ValueKind, x: &[Value], y: &[Value]) -> Option<Diff> {
	if x.len() != y.len() {
		return Some(Diff::new(MismatchKind::Length).values(x.len().to_string(), y.len().to_string()));
	}
	for index in (0..x.len()).rev() {
		if let Some(diff) = equal_value(kind, &x[index], &y[index]) {
			return Some(diff.segment(format!("[{index}]")));
		}
	}
	None
}

// Pure content equality keyed by value; enumeration order never matters.
fn equal_map(value_kind: &ValueKind, x: &HashMap<MapKey, Value>, y: &HashMap<MapKey, Value>) -> Option<Diff> {
	if x.len() != y.len() {
		return Some(Diff::new(MismatchKind::Length).values(x.len().to_string(), y.len().to_string()));
	}
	for (key, vx) in x {
		let Some(vy) = y.get(key) else {
			return Some(Diff::new(MismatchKind::MissingKey).segment(format!("[{key}]")));
		};
		if let Some(diff) = equal_value(value_kind, vx, vy) {
			return Some(diff.segment(format!("[{key}]")));
		}
	}
	None
}

fn equal_value(kind: &ValueKind, vx: &Value, vy: &Value) -> Option<Diff> {
	match kind {
		ValueKind::Message(_) => match (vx, vy) {
			(Value::Message(x), Value::Message(y)) => equal_nested(x.as_deref(), y.as_deref()),
			_ => Some(Diff::new(MismatchKind::Value).values(vx.kind_name().to_owned(), vy.kind_name().to_owned())),
		},
		ValueKind::Scalar(scalar) => equal_scalar(scalar, vx, vy),
	}
}

fn equal_nested(x: Option<&dyn MessageView>, y: Option<&dyn MessageView>) -> Option<Diff> {
	match (x, y) {
		(None, None) => None,
		(Some(mx), None) => Some(Diff::new(MismatchKind::Value).values(format_message(mx), NIL_TEXT.to_owned())),
		(None, Some(my)) => Some(Diff::new(MismatchKind::Value).values(NIL_TEXT.to_owned(), format_message(my))),
		(Some(mx), Some(my)) => equal_message(mx, my),
	}
}

fn equal_scalar(kind: &ScalarKind, vx: &Value, vy: &Value) -> Option<Diff> {
	let same = match (kind, vx, vy) {
		(ScalarKind::Bytes, Value::Bytes(x), Value::Bytes(y)) => x == y,
		// NaN on either side is a mismatch, even against another NaN.
		(ScalarKind::Float, Value::F32(x), Value::F32(y)) => !x.is_nan() && !y.is_nan() && x == y,
		(ScalarKind::Double, Value::F64(x), Value::F64(y)) => !x.is_nan() && !y.is_nan() && x == y,
		(_, Value::Bool(x), Value::Bool(y)) => x == y,
		(_, Value::I64(x), Value::I64(y)) => x == y,
		(_, Value::U64(x), Value::U64(y)) => x == y,
		(_, Value::String(x), Value::String(y)) => x == y,
		(_, Value::Enum(x), Value::Enum(y)) => x == y,
		_ => false,
	};

	if same {
		return None;
	}
	Some(Diff::new(MismatchKind::Value).values(format_scalar(vx, kind), format_scalar(vy, kind)))
}

// Raw payloads of equal length that differ byte-wise are regrouped per field
// number and compared order-independently.
fn equal_unknown(x: &[u8], y: &[u8]) -> Option<Diff> {
	if x.len() != y.len() {
		return Some(Diff::new(MismatchKind::Length).values(x.len().to_string(), y.len().to_string()));
	}
	if x == y {
		return None;
	}

	match (wire::group_unknown(x), wire::group_unknown(y)) {
		(Ok(gx), Ok(gy)) => {
			if gx == gy {
				return None;
			}
			Some(Diff::new(MismatchKind::Value).values(format_unknown_groups(&gx), format_unknown_groups(&gy)))
		}
		_ => Some(Diff::new(MismatchKind::Value).values(format_bytes(x), format_bytes(y))),
	}
}
