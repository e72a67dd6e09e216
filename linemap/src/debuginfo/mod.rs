//! # Line-Number Program Decoding
//!
//! Turns the `.debug_line` section of a compiled binary into the decoded
//! stream the address index is built from. Nothing outside this module
//! touches the container format or the DWARF encoding.
//!
//! ## What a line program is
//!
//! Each compilation unit carries a small bytecode program. Running it drives a
//! state machine whose registers (address, file, line, ...) describe where
//! generated code came from. Some instructions only adjust registers; others
//! (`DW_LNS_copy`, special opcodes, `DW_LNE_end_sequence`) append a row to the
//! line table. We keep every instruction, tagging the ones that appended a row
//! with the register state at that moment.
//!
//! ```text
//! DW_LNE_set_address 0x401000     (no row)
//! DW_LNS_advance_line 9           (no row)
//! DW_LNS_copy                     row: file=1 line=10 addr=0x401000
//! special(0x4b)                   row: file=1 line=11 addr=0x401004
//! DW_LNE_end_sequence             row: file=1 line=11 addr=0x401010
//! ```
//!
//! ## Tables
//!
//! Rows name files through a per-unit file table, and files name directories
//! through a directory table. DWARF 4 and DWARF 5 lay these out differently;
//! the decoder normalizes both to one shape:
//!
//! - directory 0 is always `"."`, the compilation directory
//! - file indexes in rows are 1-based
//!
//! **Libraries used**:
//! - `object`: ELF parsing and section lookup
//! - `gimli`: line program header parsing and instruction execution

pub mod dwarf;
pub mod line_program;

pub use dwarf::load_line_programs;
pub use line_program::{CompilationUnitLines, FileEntry, LineProgramEntry, RowState};
