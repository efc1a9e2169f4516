#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "protodiff", about = "Structural protobuf message diff tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Schema {
		schema: PathBuf,
		#[arg(long)]
		message: Option<String>,
	},
	Show {
		schema: PathBuf,
		#[arg(long)]
		message: String,
		payload: PathBuf,
	},
	Diff {
		schema: PathBuf,
		#[arg(long)]
		message: String,
		expected: PathBuf,
		actual: PathBuf,
		#[arg(long)]
		json: bool,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> protodiff::proto::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Schema { schema, message } => cmd::schema::run(schema, message),
		Commands::Show { schema, message, payload } => cmd::show::run(schema, message, payload),
		Commands::Diff {
			schema,
			message,
			expected,
			actual,
			json,
		} => cmd::diff::run(schema, message, expected, actual, json),
	}
}
