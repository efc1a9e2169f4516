use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::proto::schema::{FieldDescriptor, FieldShape, MessageDescriptor};
use crate::proto::value::{MapKey, Value};
use crate::proto::{ProtoError, Result};

/// Capability interface over a schema-described message.
///
/// The comparator and formatter consume messages exclusively through this
/// trait; any provider that upholds the value/shape invariant of
/// [`Value`] works. Field descriptors passed in always originate from
/// `descriptor()` of a message whose schema identity matched.
pub trait MessageView: fmt::Debug {
	/// Descriptor giving this message's schema identity.
	fn descriptor(&self) -> &Arc<MessageDescriptor>;

	/// Whether the field is explicitly set.
	fn has(&self, field: &FieldDescriptor) -> bool;

	/// Current value of the field, falling back to its unset default.
	fn get(&self, field: &FieldDescriptor) -> Value;

	/// Set fields in declared order. Oneof groups appear collapsed: at most
	/// one member per group, at that member's declared position.
	fn set_fields(&self) -> Vec<(&FieldDescriptor, Value)>;

	/// Raw bytes of fields the schema does not recognize.
	fn unknown(&self) -> &[u8];
}

/// In-memory [`MessageView`] provider with one slot per declared field.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
	descriptor: Arc<MessageDescriptor>,
	slots: Vec<Option<Value>>,
	unknown: Vec<u8>,
}

impl DynamicMessage {
	/// Create an empty message of the given type.
	pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
		let slots = vec![None; descriptor.fields.len()];
		Self {
			descriptor,
			slots,
			unknown: Vec::new(),
		}
	}

	/// Set a field by name, validating the value against the declared shape.
	/// Setting a oneof member clears the group's other members.
	pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
		let field = self.descriptor.field(name).ok_or_else(|| ProtoError::FieldNotFound {
			message: self.descriptor.name.to_string(),
			name: name.to_owned(),
		})?;

		check_shape(field, &value)?;
		let index = field.index;
		let oneof = field.oneof;
		self.store(index, oneof, value);
		Ok(())
	}

	/// Clear a field by name.
	pub fn clear(&mut self, name: &str) -> Result<()> {
		let field = self.descriptor.field(name).ok_or_else(|| ProtoError::FieldNotFound {
			message: self.descriptor.name.to_string(),
			name: name.to_owned(),
		})?;
		self.slots[field.index] = None;
		Ok(())
	}

	/// Replace the raw unknown-field payload.
	pub fn set_unknown(&mut self, bytes: Vec<u8>) {
		self.unknown = bytes;
	}

	/// Wrap into a field value for nesting inside another message.
	pub fn into_value(self) -> Value {
		Value::Message(Some(Arc::new(self)))
	}

	/// Store a decoded value without shape validation; the wire decoder
	/// produces conforming values by construction.
	pub(crate) fn store(&mut self, index: usize, oneof: Option<usize>, value: Value) {
		if let Some(group) = oneof {
			for member in &self.descriptor.oneofs[group].members {
				self.slots[*member] = None;
			}
		}
		self.slots[index] = Some(value);
	}

	/// List payload of a repeated field, created empty on first use.
	pub(crate) fn list_slot(&mut self, index: usize) -> &mut Vec<Value> {
		let slot = self.slots[index].get_or_insert_with(|| Value::List(Vec::new()));
		if !matches!(slot, Value::List(_)) {
			*slot = Value::List(Vec::new());
		}
		match slot {
			Value::List(items) => items,
			_ => unreachable!("slot was just normalized to a list"),
		}
	}

	/// Map payload of a map field, created empty on first use.
	pub(crate) fn map_slot(&mut self, index: usize) -> &mut HashMap<MapKey, Value> {
		let slot = self.slots[index].get_or_insert_with(|| Value::Map(HashMap::new()));
		if !matches!(slot, Value::Map(_)) {
			*slot = Value::Map(HashMap::new());
		}
		match slot {
			Value::Map(entries) => entries,
			_ => unreachable!("slot was just normalized to a map"),
		}
	}
}

impl MessageView for DynamicMessage {
	fn descriptor(&self) -> &Arc<MessageDescriptor> {
		&self.descriptor
	}

	fn has(&self, field: &FieldDescriptor) -> bool {
		self.slots.get(field.index).is_some_and(|slot| slot.is_some())
	}

	fn get(&self, field: &FieldDescriptor) -> Value {
		if let Some(Some(value)) = self.slots.get(field.index) {
			return value.clone();
		}
		match &field.shape {
			FieldShape::Singular(kind) => Value::default_of_kind(kind),
			FieldShape::Repeated(_) => Value::List(Vec::new()),
			FieldShape::Map { .. } => Value::Map(HashMap::new()),
		}
	}

	fn set_fields(&self) -> Vec<(&FieldDescriptor, Value)> {
		self.descriptor
			.fields
			.iter()
			.filter_map(|field| self.slots[field.index].as_ref().map(|value| (field, value.clone())))
			.collect()
	}

	fn unknown(&self) -> &[u8] {
		&self.unknown
	}
}

fn check_shape(field: &FieldDescriptor, value: &Value) -> Result<()> {
	let ok = match &field.shape {
		FieldShape::Singular(kind) => value.conforms(kind),
		FieldShape::Repeated(kind) => match value {
			Value::List(items) => items.iter().all(|item| item.conforms(kind)),
			_ => false,
		},
		FieldShape::Map { key, value: value_kind } => match value {
			Value::Map(entries) => entries.iter().all(|(entry_key, entry_value)| entry_key.conforms(key) && entry_value.conforms(value_kind)),
			_ => false,
		},
	};

	if ok {
		return Ok(());
	}
	Err(ProtoError::ValueShapeMismatch {
		field: field.name.to_string(),
		expected: field.shape.to_string(),
		got: value.kind_name(),
	})
}
