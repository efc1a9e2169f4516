use std::path::PathBuf;

use protodiff::proto::{DecodeOptions, Result, decode_message, format_message};

use crate::cmd::schema_file;

pub fn run(schema: PathBuf, message: String, payload: PathBuf) -> Result<()> {
	let set = schema_file::load(&schema)?;
	let descriptor = set.message(&message)?;
	let bytes = std::fs::read(&payload)?;
	let decoded = decode_message(descriptor, &bytes, &DecodeOptions::default())?;

	println!("{}", format_message(&decoded));
	Ok(())
}
