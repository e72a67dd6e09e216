//! Domain types providing compile-time safety and self-documentation
//!
//! These types name the pieces of a decoded line table: which file a row
//! belongs to, what kind of row it is, and where it landed in the binary.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Identity of a source file as recorded by the compiler
///
/// Both halves are kept literally. Two compilation units may record the same
/// file under different keys when their directory strings differ textually;
/// the index never normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFileKey {
    pub directory: String,
    pub filename: String,
}

impl SourceFileKey {
    pub fn new(directory: impl Into<String>, filename: impl Into<String>) -> Self {
        Self { directory: directory.into(), filename: filename.into() }
    }

    /// Directory joined with filename
    ///
    /// An absolute filename replaces the directory, matching how the line
    /// program header combines the two.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.filename)
    }

    /// Normalized components of the recorded directory, outermost first
    ///
    /// Directories inside `filename` are not included.
    #[must_use]
    pub fn directory_components(&self) -> Vec<String> {
        normalized_components(Path::new(&self.directory))
    }
}

impl fmt::Display for SourceFileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory, self.filename)
    }
}

/// Lexically normalize a path into its named components
///
/// Empty and `.` components disappear, `..` cancels the preceding named
/// component, and root or prefix components are not components at all.
#[must_use]
pub fn normalized_components(path: &Path) -> Vec<String> {
    let mut components: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => components.push(name.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if components.last().is_some_and(|last| last != "..") {
                    components.pop();
                } else {
                    components.push("..".to_string());
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    components
}

/// Opcode that produced a line program row
///
/// Standard and extended opcodes share numeric space, so the numeric value
/// alone does not identify the instruction; the variant does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCommand {
    Standard(u8),
    Extended(u8),
    Special(u8),
}

impl LineCommand {
    pub const COPY: Self = Self::Standard(gimli::constants::DW_LNS_copy.0);
    pub const END_SEQUENCE: Self = Self::Extended(gimli::constants::DW_LNE_end_sequence.0);

    /// Numeric opcode as encoded in the line program
    #[must_use]
    pub fn opcode(self) -> u8 {
        match self {
            Self::Standard(op) | Self::Extended(op) | Self::Special(op) => op,
        }
    }
}

impl fmt::Display for LineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Standard(op) => match gimli::DwLns(op).static_string() {
                Some(name) => f.write_str(name),
                None => write!(f, "DW_LNS_unknown({op:#x})"),
            },
            Self::Extended(op) => match gimli::DwLne(op).static_string() {
                Some(name) => f.write_str(name),
                None => write!(f, "DW_LNE_unknown({op:#x})"),
            },
            Self::Special(op) => write!(f, "special({op:#x})"),
        }
    }
}

impl Serialize for LineCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.opcode())
    }
}

/// One row of the index: the row's command and its relocated address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    pub command: LineCommand,
    pub address: u64,
}

/// One output row of a source listing
///
/// A primary record carries the line number and source text. Satellite
/// records only carry a command and address, surfacing the extra code
/// locations of the line shown just above them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    pub line_number: Option<u64>,
    pub command: Option<LineCommand>,
    pub address: Option<u64>,
    pub source_text: Option<String>,
}

impl RenderRecord {
    /// Source line with its first mapped address
    pub fn primary(line_number: u64, entry: LineEntry, source_text: impl Into<String>) -> Self {
        Self {
            line_number: Some(line_number),
            command: Some(entry.command),
            address: Some(entry.address),
            source_text: Some(source_text.into()),
        }
    }

    /// Source line without any mapped address
    pub fn unmapped(line_number: u64, source_text: impl Into<String>) -> Self {
        Self {
            line_number: Some(line_number),
            command: None,
            address: None,
            source_text: Some(source_text.into()),
        }
    }

    /// Additional address of the preceding source line
    #[must_use]
    pub fn satellite(entry: LineEntry) -> Self {
        Self {
            line_number: None,
            command: Some(entry.command),
            address: Some(entry.address),
            source_text: None,
        }
    }

    #[must_use]
    pub fn is_satellite(&self) -> bool {
        self.line_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_joins_with_slash() {
        let key = SourceFileKey::new("src/lib", "b.c");
        assert_eq!(key.to_string(), "src/lib/b.c");
    }

    #[test]
    fn test_key_components_are_normalized() {
        let key = SourceFileKey::new("a//b/./c/../d", "x.c");
        assert_eq!(key.directory_components(), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_compilation_directory_has_no_components() {
        let key = SourceFileKey::new(".", "main.c");
        assert!(key.directory_components().is_empty());
    }

    #[test]
    fn test_filename_directories_stay_out_of_components() {
        let key = SourceFileKey::new("/build", "src/main.c");
        assert_eq!(key.directory_components(), vec!["build"]);
        assert_eq!(key.path(), Path::new("/build/src/main.c"));
    }

    #[test]
    fn test_absolute_filename_overrides_directory_in_path() {
        let key = SourceFileKey::new("/build", "/usr/include/stdio.h");
        assert_eq!(key.path(), Path::new("/usr/include/stdio.h"));
    }

    #[test]
    fn test_leading_parent_dirs_are_kept() {
        assert_eq!(normalized_components(Path::new("../../x")), vec!["..", "..", "x"]);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(LineCommand::COPY.to_string(), "DW_LNS_copy");
        assert_eq!(LineCommand::END_SEQUENCE.to_string(), "DW_LNE_end_sequence");
        assert_eq!(LineCommand::Special(0x4b).to_string(), "special(0x4b)");
        assert_eq!(LineCommand::END_SEQUENCE.opcode(), 1);
    }

    #[test]
    fn test_command_serializes_as_opcode() {
        let json = serde_json::to_string(&LineCommand::Special(0x13)).unwrap();
        assert_eq!(json, "19");
    }

    #[test]
    fn test_satellite_record_has_no_source() {
        let entry = LineEntry { command: LineCommand::COPY, address: 0x10 };
        let record = RenderRecord::satellite(entry);
        assert!(record.is_satellite());
        assert_eq!(record.source_text, None);
        assert_eq!(record.address, Some(0x10));
    }
}
