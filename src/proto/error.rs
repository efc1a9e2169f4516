use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors produced while building schemas, populating messages, and decoding wire data.
#[derive(Debug, Error)]
pub enum ProtoError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Schema definition file was not valid JSON.
	#[error("schema json: {0}")]
	SchemaJson(#[from] serde_json::Error),
	/// Two fields in one message declared the same number.
	#[error("duplicate field number {number} in message {message}")]
	DuplicateFieldNumber {
		/// Message type name.
		message: String,
		/// Offending field number.
		number: u32,
	},
	/// Two fields in one message declared the same name.
	#[error("duplicate field name {name} in message {message}")]
	DuplicateFieldName {
		/// Message type name.
		message: String,
		/// Offending field name.
		name: String,
	},
	/// Field number outside the valid protobuf range.
	#[error("field number {number} out of range in message {message}")]
	FieldNumberOutOfRange {
		/// Message type name.
		message: String,
		/// Offending field number.
		number: u32,
	},
	/// Map field declared a key kind maps cannot use.
	#[error("invalid map key kind {kind} for field {field}")]
	InvalidMapKeyKind {
		/// Field name.
		field: String,
		/// Declared key kind name.
		kind: &'static str,
	},
	/// Field referenced a oneof group index the message does not declare.
	#[error("oneof index {oneof} out of range for field {field}")]
	OneofOutOfRange {
		/// Field name.
		field: String,
		/// Referenced group index.
		oneof: usize,
	},
	/// Oneof members must be singular fields.
	#[error("oneof member {field} must be singular")]
	OneofMemberNotSingular {
		/// Field name.
		field: String,
	},
	/// Requested field name does not exist on the message type.
	#[error("unknown field {name} on message {message}")]
	FieldNotFound {
		/// Message type name.
		message: String,
		/// Requested field name.
		name: String,
	},
	/// Supplied value does not conform to the field's declared shape.
	#[error("value shape mismatch for field {field}: expected {expected}, got {got}")]
	ValueShapeMismatch {
		/// Field name.
		field: String,
		/// Declared shape description.
		expected: String,
		/// Supplied value kind name.
		got: &'static str,
	},
	/// Map key value does not conform to the field's declared key kind.
	#[error("map key kind mismatch for field {field}")]
	MapKeyKindMismatch {
		/// Field name.
		field: String,
	},
	/// Referenced message type was not declared.
	#[error("unknown message type: {name}")]
	MessageTypeNotFound {
		/// Requested type name.
		name: String,
	},
	/// Referenced enum type was not declared.
	#[error("unknown enum type: {name}")]
	EnumTypeNotFound {
		/// Requested type name.
		name: String,
	},
	/// Field kind string in a schema definition was not recognized.
	#[error("unknown field kind: {kind}")]
	UnknownFieldKind {
		/// Offending kind string.
		kind: String,
	},
	/// Field referenced a oneof group name the message does not declare.
	#[error("unknown oneof {name} for field {field}")]
	OneofNotFound {
		/// Field name.
		field: String,
		/// Referenced group name.
		name: String,
	},
	/// Wire data ended inside a field.
	#[error("wire truncated at offset {at}")]
	WireTruncated {
		/// Byte offset where the read was attempted.
		at: usize,
	},
	/// Varint exceeded 64 bits.
	#[error("wire varint overflow at offset {at}")]
	WireVarintOverflow {
		/// Byte offset where the varint started.
		at: usize,
	},
	/// Tag carried a zero or out-of-range field number or unknown wire type.
	#[error("wire invalid tag at offset {at}")]
	WireInvalidTag {
		/// Byte offset of the tag.
		at: usize,
	},
	/// Group end tag without a matching group start.
	#[error("wire unmatched group end at offset {at}")]
	WireUnmatchedGroupEnd {
		/// Byte offset of the end tag.
		at: usize,
	},
	/// Field was encoded with a wire type its declared kind cannot use.
	#[error("wire type {wire_type} unexpected for field {field}")]
	WireUnexpectedType {
		/// Field name.
		field: String,
		/// Encoded wire type.
		wire_type: u8,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
}
