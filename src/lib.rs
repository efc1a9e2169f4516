//! Public library API for structural protobuf message comparison.

/// Schema model, runtime values, comparator, canonical formatter, and wire decoding.
pub mod proto;
