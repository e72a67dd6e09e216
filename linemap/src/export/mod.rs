//! Index export functionality
//!
//! This module provides functionality for exporting the address index to
//! external formats. Currently supports a JSON dump of the whole index.

pub mod json_dump;

pub use json_dump::write_json;
