use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use protodiff::proto::{EnumDescriptor, FieldDescriptor, MessageDescriptor, ProtoError, Result, ScalarKind, ValueKind};

/// Parsed JSON schema definition file.
#[derive(Debug, Deserialize)]
pub struct SchemaFile {
	#[serde(default)]
	enums: Vec<EnumDef>,
	messages: Vec<MessageDef>,
}

#[derive(Debug, Deserialize)]
struct EnumDef {
	name: String,
	values: Vec<EnumValueDef>,
}

#[derive(Debug, Deserialize)]
struct EnumValueDef {
	name: String,
	number: i32,
}

#[derive(Debug, Deserialize)]
struct MessageDef {
	name: String,
	#[serde(default)]
	oneofs: Vec<String>,
	fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
struct FieldDef {
	number: u32,
	name: String,
	kind: String,
	#[serde(rename = "type", default)]
	type_name: Option<String>,
	#[serde(default)]
	repeated: bool,
	#[serde(default)]
	map_key: Option<String>,
	#[serde(default)]
	oneof: Option<String>,
}

/// Built descriptors from one schema file, in declaration order.
pub struct SchemaSet {
	enums: HashMap<String, Arc<EnumDescriptor>>,
	messages: Vec<(String, Arc<MessageDescriptor>)>,
}

impl SchemaSet {
	/// Look up a message type by name.
	pub fn message(&self, name: &str) -> Result<&Arc<MessageDescriptor>> {
		self.messages
			.iter()
			.find(|(message_name, _)| message_name == name)
			.map(|(_, descriptor)| descriptor)
			.ok_or_else(|| ProtoError::MessageTypeNotFound { name: name.to_owned() })
	}

	/// Number of declared enums.
	pub fn enum_count(&self) -> usize {
		self.enums.len()
	}

	/// Number of declared messages.
	pub fn message_count(&self) -> usize {
		self.messages.len()
	}
}

/// Load and build a JSON schema definition file. Messages may reference only
/// previously declared messages, which keeps schemas acyclic by construction.
pub fn load(path: &Path) -> Result<SchemaSet> {
	let text = std::fs::read_to_string(path)?;
	let file: SchemaFile = serde_json::from_str(&text)?;
	build(file)
}

fn build(file: SchemaFile) -> Result<SchemaSet> {
	let mut enums = HashMap::new();
	for def in &file.enums {
		let pairs: Vec<(&str, i32)> = def.values.iter().map(|value| (value.name.as_str(), value.number)).collect();
		enums.insert(def.name.clone(), EnumDescriptor::new(&def.name, &pairs));
	}

	let mut messages: Vec<(String, Arc<MessageDescriptor>)> = Vec::new();
	for def in &file.messages {
		let mut fields = Vec::with_capacity(def.fields.len());
		for field in &def.fields {
			fields.push(build_field(field, def, &enums, &messages)?);
		}
		let oneof_names: Vec<&str> = def.oneofs.iter().map(String::as_str).collect();
		let descriptor = MessageDescriptor::new(&def.name, fields, &oneof_names)?;
		messages.push((def.name.clone(), descriptor));
	}

	Ok(SchemaSet { enums, messages })
}

fn build_field(
	field: &FieldDef,
	message: &MessageDef,
	enums: &HashMap<String, Arc<EnumDescriptor>>,
	messages: &[(String, Arc<MessageDescriptor>)],
) -> Result<FieldDescriptor> {
	let kind = resolve_kind(field, enums, messages)?;

	let mut descriptor = match (&field.map_key, field.repeated) {
		(Some(key_name), _) => FieldDescriptor::map(field.number, &field.name, plain_scalar(key_name)?, kind),
		(None, true) => FieldDescriptor::repeated(field.number, &field.name, kind),
		(None, false) => FieldDescriptor::singular(field.number, &field.name, kind),
	};

	if let Some(oneof_name) = &field.oneof {
		let group = message
			.oneofs
			.iter()
			.position(|name| name == oneof_name)
			.ok_or_else(|| ProtoError::OneofNotFound {
				field: field.name.clone(),
				name: oneof_name.clone(),
			})?;
		descriptor = descriptor.in_oneof(group);
	}

	Ok(descriptor)
}

fn resolve_kind(field: &FieldDef, enums: &HashMap<String, Arc<EnumDescriptor>>, messages: &[(String, Arc<MessageDescriptor>)]) -> Result<ValueKind> {
	match field.kind.as_str() {
		"message" => {
			let name = field.type_name.as_deref().unwrap_or_default();
			let descriptor = messages
				.iter()
				.find(|(message_name, _)| message_name == name)
				.map(|(_, descriptor)| descriptor.clone())
				.ok_or_else(|| ProtoError::MessageTypeNotFound { name: name.to_owned() })?;
			Ok(ValueKind::Message(descriptor))
		}
		"enum" => {
			let name = field.type_name.as_deref().unwrap_or_default();
			let descriptor = enums.get(name).cloned().ok_or_else(|| ProtoError::EnumTypeNotFound { name: name.to_owned() })?;
			Ok(ValueKind::Scalar(ScalarKind::Enum(descriptor)))
		}
		other => Ok(ValueKind::Scalar(plain_scalar(other)?)),
	}
}

fn plain_scalar(kind: &str) -> Result<ScalarKind> {
	let scalar = match kind {
		"bool" => ScalarKind::Bool,
		"int32" => ScalarKind::Int32,
		"int64" => ScalarKind::Int64,
		"sint32" => ScalarKind::Sint32,
		"sint64" => ScalarKind::Sint64,
		"sfixed32" => ScalarKind::Sfixed32,
		"sfixed64" => ScalarKind::Sfixed64,
		"uint32" => ScalarKind::Uint32,
		"uint64" => ScalarKind::Uint64,
		"fixed32" => ScalarKind::Fixed32,
		"fixed64" => ScalarKind::Fixed64,
		"float" => ScalarKind::Float,
		"double" => ScalarKind::Double,
		"string" => ScalarKind::String,
		"bytes" => ScalarKind::Bytes,
		_ => return Err(ProtoError::UnknownFieldKind { kind: kind.to_owned() }),
	};
	Ok(scalar)
}
