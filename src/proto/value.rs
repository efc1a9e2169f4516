use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::proto::message::MessageView;
use crate::proto::schema::{ScalarKind, ValueKind};

/// Runtime value held by a message field.
///
/// Invariant: a value's tag is always consistent with its field's declared
/// shape; [`crate::proto::DynamicMessage`] enforces this on every write.
#[derive(Debug, Clone)]
pub enum Value {
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar, all widths widened.
	I64(i64),
	/// Unsigned integer scalar, all widths widened.
	U64(u64),
	/// 32-bit float scalar.
	F32(f32),
	/// 64-bit float scalar.
	F64(f64),
	/// UTF-8 string.
	String(Box<str>),
	/// Opaque byte payload.
	Bytes(Vec<u8>),
	/// Enum ordinal.
	Enum(i32),
	/// Nested message reference; `None` is the absent record, distinct from an
	/// empty present one.
	Message(Option<Arc<dyn MessageView>>),
	/// Repeated field payload, order significant.
	List(Vec<Value>),
	/// Map field payload; iteration order is unspecified.
	Map(HashMap<MapKey, Value>),
}

/// Scalar key of a map field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
	/// Boolean key.
	Bool(bool),
	/// Signed integer key.
	I64(i64),
	/// Unsigned integer key.
	U64(u64),
	/// String key.
	String(Box<str>),
}

impl fmt::Display for MapKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(value) => write!(f, "{value}"),
			Self::I64(value) => write!(f, "{value}"),
			Self::U64(value) => write!(f, "{value}"),
			Self::String(value) => f.write_str(value),
		}
	}
}

impl MapKey {
	/// Whether the key's tag is consistent with the declared key kind.
	pub fn conforms(&self, kind: &ScalarKind) -> bool {
		match (kind, self) {
			(ScalarKind::Bool, Self::Bool(_)) => true,
			(ScalarKind::Int32 | ScalarKind::Int64 | ScalarKind::Sint32 | ScalarKind::Sint64 | ScalarKind::Sfixed32 | ScalarKind::Sfixed64, Self::I64(_)) => true,
			(ScalarKind::Uint32 | ScalarKind::Uint64 | ScalarKind::Fixed32 | ScalarKind::Fixed64, Self::U64(_)) => true,
			(ScalarKind::String, Self::String(_)) => true,
			_ => false,
		}
	}

	/// Convert a decoded scalar value into a key, when the tag allows it.
	pub(crate) fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Bool(inner) => Some(Self::Bool(*inner)),
			Value::I64(inner) => Some(Self::I64(*inner)),
			Value::U64(inner) => Some(Self::U64(*inner)),
			Value::String(inner) => Some(Self::String(inner.clone())),
			_ => None,
		}
	}
}

impl Value {
	/// Short tag name for diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Bool(_) => "Bool",
			Self::I64(_) => "I64",
			Self::U64(_) => "U64",
			Self::F32(_) => "F32",
			Self::F64(_) => "F64",
			Self::String(_) => "String",
			Self::Bytes(_) => "Bytes",
			Self::Enum(_) => "Enum",
			Self::Message(_) => "Message",
			Self::List(_) => "List",
			Self::Map(_) => "Map",
		}
	}

	/// Unset default for a scalar kind.
	pub fn default_of(kind: &ScalarKind) -> Self {
		match kind {
			ScalarKind::Bool => Self::Bool(false),
			ScalarKind::Int32 | ScalarKind::Int64 | ScalarKind::Sint32 | ScalarKind::Sint64 | ScalarKind::Sfixed32 | ScalarKind::Sfixed64 => Self::I64(0),
			ScalarKind::Uint32 | ScalarKind::Uint64 | ScalarKind::Fixed32 | ScalarKind::Fixed64 => Self::U64(0),
			ScalarKind::Float => Self::F32(0.0),
			ScalarKind::Double => Self::F64(0.0),
			ScalarKind::String => Self::String("".into()),
			ScalarKind::Bytes => Self::Bytes(Vec::new()),
			ScalarKind::Enum(_) => Self::Enum(0),
		}
	}

	/// Unset default for a singular value position.
	pub fn default_of_kind(kind: &ValueKind) -> Self {
		match kind {
			ValueKind::Scalar(scalar) => Self::default_of(scalar),
			ValueKind::Message(_) => Self::Message(None),
		}
	}

	/// Whether the value's tag is consistent with a declared scalar kind.
	pub fn conforms_scalar(&self, kind: &ScalarKind) -> bool {
		match (kind, self) {
			(ScalarKind::Bool, Self::Bool(_)) => true,
			(ScalarKind::Int32 | ScalarKind::Int64 | ScalarKind::Sint32 | ScalarKind::Sint64 | ScalarKind::Sfixed32 | ScalarKind::Sfixed64, Self::I64(_)) => true,
			(ScalarKind::Uint32 | ScalarKind::Uint64 | ScalarKind::Fixed32 | ScalarKind::Fixed64, Self::U64(_)) => true,
			(ScalarKind::Float, Self::F32(_)) => true,
			(ScalarKind::Double, Self::F64(_)) => true,
			(ScalarKind::String, Self::String(_)) => true,
			(ScalarKind::Bytes, Self::Bytes(_)) => true,
			(ScalarKind::Enum(_), Self::Enum(_)) => true,
			_ => false,
		}
	}

	/// Whether the value's tag is consistent with a declared singular kind.
	/// Nested messages must carry the exact descriptor the schema names.
	pub fn conforms(&self, kind: &ValueKind) -> bool {
		match kind {
			ValueKind::Scalar(scalar) => self.conforms_scalar(scalar),
			ValueKind::Message(descriptor) => match self {
				Self::Message(None) => true,
				Self::Message(Some(view)) => Arc::ptr_eq(view.descriptor(), descriptor),
				_ => false,
			},
		}
	}
}
