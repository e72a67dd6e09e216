//! # Reverse lookup: address → source line
//!
//! The address index answers "which addresses did this line produce". This
//! module answers the opposite question for single addresses taken from a
//! crash report, a trace, or a disassembly listing.
//!
//! ## Base addresses
//!
//! Line tables record **file addresses**. When the tool is given a base
//! address (for a relocated or position-independent image), runtime
//! addresses are translated before lookup:
//!
//! ```text
//! Runtime Address = Base Address + File Address
//! File Address    = Runtime Address - Base Address
//! ```
//!
//! ## Inlining
//!
//! Optimized code may inline functions, so a single address can belong to
//! several source locations at once. [`Symbolizer::resolve`] returns all of
//! them, innermost first.
//!
//! **Libraries used**:
//! - `addr2line`: address lookup, inline frame walking and demangling, built on gimli
//! - `object`: ELF binary parser

pub mod symbolizer;

pub use symbolizer::{InlinedFrame, ResolvedAddress, SourceLocation, Symbolizer};
