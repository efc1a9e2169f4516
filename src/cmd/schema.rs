use std::path::PathBuf;

use protodiff::proto::Result;

use crate::cmd::schema_file;

pub fn run(path: PathBuf, message: Option<String>) -> Result<()> {
	let set = schema_file::load(&path)?;

	println!("path: {}", path.display());
	println!("enums: {}", set.enum_count());
	println!("messages: {}", set.message_count());

	if let Some(name) = message {
		let descriptor = set.message(&name)?;
		println!("message: {}", descriptor.name);
		println!("field_count: {}", descriptor.fields.len());
		for field in &descriptor.fields {
			println!("  {} {} {}", field.number, field.name, field.shape);
		}
	}

	Ok(())
}
