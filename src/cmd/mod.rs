pub mod diff;
pub mod schema;
pub mod schema_file;
pub mod show;
