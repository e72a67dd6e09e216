//! Domain model for linemap
//!
//! Source file keys, line program commands and listing records shared by the
//! index, resolver and query layers, plus one error enum per layer.

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{normalized_components, LineCommand, LineEntry, RenderRecord, SourceFileKey};

pub use errors::{ExportError, IndexError, QueryError};
