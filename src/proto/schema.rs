use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::proto::{ProtoError, Result};

const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Declared kind of a scalar field value.
#[derive(Debug, Clone)]
pub enum ScalarKind {
	/// Boolean.
	Bool,
	/// Signed 32-bit varint.
	Int32,
	/// Signed 64-bit varint.
	Int64,
	/// Zigzag-encoded signed 32-bit varint.
	Sint32,
	/// Zigzag-encoded signed 64-bit varint.
	Sint64,
	/// Signed 32-bit fixed-width.
	Sfixed32,
	/// Signed 64-bit fixed-width.
	Sfixed64,
	/// Unsigned 32-bit varint.
	Uint32,
	/// Unsigned 64-bit varint.
	Uint64,
	/// Unsigned 32-bit fixed-width.
	Fixed32,
	/// Unsigned 64-bit fixed-width.
	Fixed64,
	/// Single-precision float.
	Float,
	/// Double-precision float.
	Double,
	/// UTF-8 string.
	String,
	/// Opaque byte sequence.
	Bytes,
	/// Enumerated value with its descriptor for symbolic rendering.
	Enum(Arc<EnumDescriptor>),
}

impl ScalarKind {
	/// Short kind name for diagnostics.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int32 => "int32",
			Self::Int64 => "int64",
			Self::Sint32 => "sint32",
			Self::Sint64 => "sint64",
			Self::Sfixed32 => "sfixed32",
			Self::Sfixed64 => "sfixed64",
			Self::Uint32 => "uint32",
			Self::Uint64 => "uint64",
			Self::Fixed32 => "fixed32",
			Self::Fixed64 => "fixed64",
			Self::Float => "float",
			Self::Double => "double",
			Self::String => "string",
			Self::Bytes => "bytes",
			Self::Enum(_) => "enum",
		}
	}

	/// Whether this kind may key a map field.
	pub fn is_valid_map_key(&self) -> bool {
		!matches!(self, Self::Float | Self::Double | Self::Bytes | Self::Enum(_))
	}
}

impl fmt::Display for ScalarKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Enum(desc) => write!(f, "enum {}", desc.name),
			_ => f.write_str(self.name()),
		}
	}
}

/// Declared kind of a singular value position (field, list element, map value).
#[derive(Debug, Clone)]
pub enum ValueKind {
	/// Scalar position.
	Scalar(ScalarKind),
	/// Nested message position.
	Message(Arc<MessageDescriptor>),
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(kind) => write!(f, "{kind}"),
			Self::Message(desc) => f.write_str(&desc.name),
		}
	}
}

/// Declared shape of a field: singular, repeated, or associative.
#[derive(Debug, Clone)]
pub enum FieldShape {
	/// Exactly one value position.
	Singular(ValueKind),
	/// Ordered list of values.
	Repeated(ValueKind),
	/// Associative map with scalar keys.
	Map {
		/// Key kind; restricted to bool, integer kinds, and string.
		key: ScalarKind,
		/// Value kind.
		value: ValueKind,
	},
}

impl fmt::Display for FieldShape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Singular(kind) => write!(f, "{kind}"),
			Self::Repeated(kind) => write!(f, "repeated {kind}"),
			Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
		}
	}
}

/// One field declaration inside a message type.
#[derive(Debug)]
pub struct FieldDescriptor {
	/// Declaration-order index within the owning message.
	pub index: usize,
	/// Wire field number.
	pub number: u32,
	/// Field name.
	pub name: Box<str>,
	/// Declared shape.
	pub shape: FieldShape,
	/// Owning oneof group index, when the field is a oneof member.
	pub oneof: Option<usize>,
}

impl FieldDescriptor {
	/// Declare a singular field.
	pub fn singular(number: u32, name: &str, kind: ValueKind) -> Self {
		Self {
			index: 0,
			number,
			name: name.into(),
			shape: FieldShape::Singular(kind),
			oneof: None,
		}
	}

	/// Declare a repeated field.
	pub fn repeated(number: u32, name: &str, kind: ValueKind) -> Self {
		Self {
			index: 0,
			number,
			name: name.into(),
			shape: FieldShape::Repeated(kind),
			oneof: None,
		}
	}

	/// Declare a map field.
	pub fn map(number: u32, name: &str, key: ScalarKind, value: ValueKind) -> Self {
		Self {
			index: 0,
			number,
			name: name.into(),
			shape: FieldShape::Map { key, value },
			oneof: None,
		}
	}

	/// Mark the field as a member of the oneof group at `group` (an index into
	/// the names passed to [`MessageDescriptor::new`]).
	pub fn in_oneof(mut self, group: usize) -> Self {
		self.oneof = Some(group);
		self
	}
}

/// One oneof group declaration: at most one member may be set at a time.
#[derive(Debug)]
pub struct OneofDescriptor {
	/// Group name.
	pub name: Box<str>,
	/// Member field indexes in declaration order.
	pub members: Vec<usize>,
}

/// A message type: named, ordered field declarations plus oneof groups.
///
/// Identity is `Arc` pointer identity: two separately built descriptors are
/// distinct schemas even when structurally identical.
#[derive(Debug)]
pub struct MessageDescriptor {
	/// Message type name.
	pub name: Box<str>,
	/// Field declarations in declaration order; `index` matches position.
	pub fields: Vec<FieldDescriptor>,
	/// Oneof groups referenced by field `oneof` indexes.
	pub oneofs: Vec<OneofDescriptor>,
}

impl MessageDescriptor {
	/// Validate field declarations, assign declaration-order indexes, and
	/// collect oneof membership.
	pub fn new(name: &str, mut fields: Vec<FieldDescriptor>, oneofs: &[&str]) -> Result<Arc<Self>> {
		let mut numbers = HashSet::new();
		let mut names = HashSet::new();
		let mut groups: Vec<OneofDescriptor> = oneofs
			.iter()
			.map(|group| OneofDescriptor {
				name: (*group).into(),
				members: Vec::new(),
			})
			.collect();

		for (index, field) in fields.iter_mut().enumerate() {
			field.index = index;

			if field.number == 0 || field.number > MAX_FIELD_NUMBER {
				return Err(ProtoError::FieldNumberOutOfRange {
					message: name.to_owned(),
					number: field.number,
				});
			}
			if !numbers.insert(field.number) {
				return Err(ProtoError::DuplicateFieldNumber {
					message: name.to_owned(),
					number: field.number,
				});
			}
			if !names.insert(field.name.clone()) {
				return Err(ProtoError::DuplicateFieldName {
					message: name.to_owned(),
					name: field.name.to_string(),
				});
			}

			if let FieldShape::Map { key, .. } = &field.shape {
				if !key.is_valid_map_key() {
					return Err(ProtoError::InvalidMapKeyKind {
						field: field.name.to_string(),
						kind: key.name(),
					});
				}
			}

			if let Some(group) = field.oneof {
				if group >= groups.len() {
					return Err(ProtoError::OneofOutOfRange {
						field: field.name.to_string(),
						oneof: group,
					});
				}
				if !matches!(field.shape, FieldShape::Singular(_)) {
					return Err(ProtoError::OneofMemberNotSingular {
						field: field.name.to_string(),
					});
				}
				groups[group].members.push(index);
			}
		}

		Ok(Arc::new(Self {
			name: name.into(),
			fields,
			oneofs: groups,
		}))
	}

	/// Look up a field declaration by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}

	/// Look up a field declaration by wire number.
	pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.number == number)
	}
}

/// One symbolic value of an enum type.
#[derive(Debug, Clone)]
pub struct EnumValue {
	/// Symbolic name.
	pub name: Box<str>,
	/// Wire number.
	pub number: i32,
}

/// An enum type: named (number, symbol) pairs.
#[derive(Debug)]
pub struct EnumDescriptor {
	/// Enum type name.
	pub name: Box<str>,
	/// Declared values in declaration order.
	pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
	/// Build an enum descriptor from (symbol, number) pairs.
	pub fn new(name: &str, values: &[(&str, i32)]) -> Arc<Self> {
		Arc::new(Self {
			name: name.into(),
			values: values
				.iter()
				.map(|(value_name, number)| EnumValue {
					name: (*value_name).into(),
					number: *number,
				})
				.collect(),
		})
	}

	/// Symbolic name for a wire number; first declaration wins for aliases.
	pub fn symbol(&self, number: i32) -> Option<&str> {
		self.values.iter().find(|value| value.number == number).map(|value| value.name.as_ref())
	}
}
