mod assert;
mod diff;
mod equal;
mod error;
mod format;
mod message;
mod schema;
mod sort;
mod value;
mod wire;

/// Panic-on-diff assertion glue for test code.
pub use assert::assert_equal;
/// First-divergence report and its categories.
pub use diff::{Diff, MismatchKind};
/// Structural equality entry point.
pub use equal::equal;
/// Error and result aliases.
pub use error::{ProtoError, Result};
/// Canonical single-line message rendering.
pub use format::format_message;
/// Message capability interface and in-memory provider.
pub use message::{DynamicMessage, MessageView};
/// Schema descriptor types.
pub use schema::{EnumDescriptor, EnumValue, FieldDescriptor, FieldShape, MessageDescriptor, OneofDescriptor, ScalarKind, ValueKind};
/// Runtime value types.
pub use value::{MapKey, Value};
/// Wire decoding entry point and options.
pub use wire::{DecodeOptions, decode_message};
