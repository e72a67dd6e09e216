//! Structured error types for linemap
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Index construction errors are fatal; query errors describe one file and
//! never stop a batch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Malformed debug info in compilation unit {unit}: {detail}")]
    MalformedDebugInfo { unit: usize, detail: String },

    #[error("Invalid base address '{0}': expected a hexadecimal number")]
    InvalidBaseAddress(String),

    #[error("Address 0x{address:x} overflows when offset by base address 0x{base:x}")]
    AddressOverflow { address: u64, base: u64 },
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0} is not referenced in the executable")]
    FileNotReferenced(String),

    #[error("{path} matches {candidates} referenced files, use a more specific path")]
    AmbiguousFile { path: String, candidates: usize },

    #[error("Failed to read source file {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
