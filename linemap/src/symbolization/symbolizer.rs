// String formatting intentionally uses format! for clarity
#![allow(clippy::format_push_string)]

use addr2line::Context;
use anyhow::{Context as _, Result};
use gimli::{EndianRcSlice, RunTimeEndian};
use object::{Object, ObjectSection};
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Resolves code addresses back to source locations
pub struct Symbolizer {
    ctx: Context<EndianRcSlice<RunTimeEndian>>,
}

impl Symbolizer {
    /// Create a new symbolizer for the given binary
    ///
    /// # Errors
    /// Returns an error if the binary file cannot be read or parsed, or if DWARF debug info is missing
    pub fn new<P: AsRef<Path>>(binary_path: P) -> Result<Self> {
        let binary_data = fs::read(binary_path.as_ref()).context("Failed to read binary file")?;

        let obj_file = object::File::parse(&*binary_data).context("Failed to parse object file")?;

        let endian =
            if obj_file.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };

        let load_section =
            |id: gimli::SectionId| -> Result<EndianRcSlice<RunTimeEndian>, gimli::Error> {
                let data = obj_file
                    .section_by_name(id.name())
                    .and_then(|section| section.uncompressed_data().ok())
                    .unwrap_or(std::borrow::Cow::Borrowed(&[][..]));
                Ok(EndianRcSlice::new(Rc::from(&*data), endian))
            };

        let dwarf = gimli::Dwarf::load(&load_section)?;
        let ctx = Context::from_dwarf(dwarf).context("Failed to load DWARF debug information")?;

        Ok(Self { ctx })
    }

    /// Source locations of `address`, innermost inlined frame first
    ///
    /// `address` is a file address: subtract any base address first.
    #[must_use]
    pub fn resolve(&self, address: u64) -> ResolvedAddress {
        let mut frames = Vec::new();

        if let Ok(mut frame_iter) = self.ctx.find_frames(address).skip_all_loads() {
            while let Ok(Some(frame)) = frame_iter.next() {
                let function = frame
                    .function
                    .and_then(|f| f.demangle().ok().map(|s| s.to_string()))
                    .unwrap_or_else(|| "<unknown>".to_string());

                let location = frame.location.map(|loc| SourceLocation {
                    file: loc.file.map(std::string::ToString::to_string),
                    line: loc.line,
                    column: loc.column,
                });

                frames.push(InlinedFrame { function, location });
            }
        }

        ResolvedAddress { address, frames }
    }
}

/// Every source location generated code at one address came from
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    pub address: u64,
    /// Empty if the address is not covered by any line table
    pub frames: Vec<InlinedFrame>,
}

/// An inlined frame within a resolved address
#[derive(Debug, Clone)]
pub struct InlinedFrame {
    pub function: String,
    pub location: Option<SourceLocation>,
}

/// Source code location
#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl SourceLocation {
    /// `file:line:column`, dropping the parts that are unknown
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = self.file.clone().unwrap_or_else(|| "??".to_string());
        if let Some(line) = self.line {
            output.push_str(&format!(":{line}"));
            if let Some(column) = self.column {
                output.push_str(&format!(":{column}"));
            }
        }
        output
    }
}

impl ResolvedAddress {
    /// Format for display, `displayed` being the address the user asked for
    #[must_use]
    pub fn format(&self, displayed: u64) -> String {
        if self.frames.is_empty() {
            return format!("{displayed:#x} ??");
        }

        let mut output = String::new();
        for (idx, inlined) in self.frames.iter().enumerate() {
            let prefix = if idx == 0 { format!("{displayed:#x}") } else { "  (inlined by)".to_string() };
            output.push_str(&format!("{prefix} {}", inlined.function));
            if let Some(ref loc) = inlined.location {
                output.push_str(&format!(" at {}", loc.format()));
            }
            if idx < self.frames.len() - 1 {
                output.push('\n');
            }
        }
        output
    }
}
