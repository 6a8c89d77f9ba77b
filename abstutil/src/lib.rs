//! Small utilities shared by the markup crates: logging setup and reading/writing JSON files.

#[macro_use]
extern crate log;

mod io;
pub mod logger;

pub use crate::io::{deserialize_btreemap, read_json, serialize_btreemap, to_json, write_json};
