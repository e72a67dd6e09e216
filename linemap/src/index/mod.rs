//! Address index
//!
//! Merges the decoded line programs of all compilation units into one
//! read-only map: source file → line → ordered `(command, address)` entries.

pub mod address_index;
pub mod base_address;

pub use address_index::{AddressIndex, LineTable};
pub use base_address::parse_base_address;
