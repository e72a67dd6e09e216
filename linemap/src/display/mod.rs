//! Presentation of query results
//!
//! Plain formatting of the records produced by [`crate::query`]. Nothing in
//! the index or query modules knows about colors or column widths.

pub mod listing;
pub mod theme;

pub use listing::{write_addresses, ListingStyle};
