//! # Queries over the address index
//!
//! The [`QueryEngine`] answers the questions the command line asks:
//!
//! - which addresses were generated for `file:line`
//! - the whole per-line table of a file
//! - an annotated listing of a source file, or of every indexed file
//!   recreated under a source root
//! - a structural dump of everything
//!
//! Every path goes through [`crate::resolver::FileResolver`] first, so a
//! request for `src/util.c` finds the right `util.c` even when several
//! compilation units recorded one.
//!
//! ## Listing layout
//!
//! ```text
//!  41       0x401136 int main(void) {
//!  42       0x40113e     for (int i = 0; i < n; i++)
//!           0x401160
//!  43       0x401149         total += f(i);
//!  44                    return total;
//! ```
//!
//! Line 42 has two entries: the first is shown with the source text, the
//! second as a satellite row with no text. Line 44 has none.

pub mod dump;
pub mod engine;
pub mod source;

pub use dump::{DumpEntry, IndexDump};
pub use engine::{DirectoryEntry, QueryEngine};
pub use source::{FsSourceReader, SourceReader};
