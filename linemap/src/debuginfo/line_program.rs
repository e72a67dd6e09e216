//! Decoded line program stream
//!
//! One [`CompilationUnitLines`] per compilation unit, in the order the units
//! appear in the binary. This is everything the address index consumes.

use crate::domain::LineCommand;

/// Decoded line-number program of a single compilation unit
#[derive(Debug, Clone, Default)]
pub struct CompilationUnitLines {
    /// `DW_AT_name` of the unit, kept for log messages
    pub name: Option<String>,
    /// Directory table, with the compilation directory `"."` at index 0
    pub directories: Vec<String>,
    /// File table, referenced 1-based by [`RowState::file`]
    pub files: Vec<FileEntry>,
    /// Every instruction of the program, in program order
    pub entries: Vec<LineProgramEntry>,
}

/// File table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub directory_index: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, directory_index: u64) -> Self {
        Self { name: name.into(), directory_index }
    }
}

/// One executed instruction
///
/// `state` is only present when the instruction appended a row to the line
/// table. Instructions that merely adjust registers carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineProgramEntry {
    pub command: LineCommand,
    pub state: Option<RowState>,
}

impl LineProgramEntry {
    #[must_use]
    pub fn row(command: LineCommand, file: u64, line: u64, address: u64) -> Self {
        Self { command, state: Some(RowState { file, line, address }) }
    }

    #[must_use]
    pub fn no_row(command: LineCommand) -> Self {
        Self { command, state: None }
    }
}

/// State machine registers at the moment a row was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowState {
    /// 1-based index into [`CompilationUnitLines::files`]
    pub file: u64,
    pub line: u64,
    /// Address as decoded, before any base address is applied
    pub address: u64,
}
