use std::path::PathBuf;

use protodiff::proto::{DecodeOptions, Result, decode_message, equal};

use crate::cmd::schema_file;

pub fn run(schema: PathBuf, message: String, expected: PathBuf, actual: PathBuf, json: bool) -> Result<()> {
	let set = schema_file::load(&schema)?;
	let descriptor = set.message(&message)?;
	let options = DecodeOptions::default();
	let left = decode_message(descriptor, &std::fs::read(&expected)?, &options)?;
	let right = decode_message(descriptor, &std::fs::read(&actual)?, &options)?;

	let Some(diff) = equal(Some(&left), Some(&right)) else {
		if json {
			println!("{}", serde_json::json!({ "equal": true }));
		} else {
			println!("messages are equal");
		}
		return Ok(());
	};

	if json {
		println!(
			"{}",
			serde_json::json!({
				"equal": false,
				"path": diff.path_string(),
				"kind": diff.kind.to_string(),
				"expected": diff.expected,
				"actual": diff.actual,
			})
		);
	} else {
		println!("{diff}");
	}
	std::process::exit(2);
}
