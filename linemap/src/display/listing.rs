use crossterm::style::{Color, Stylize};
use std::io::{self, Write};
use std::path::Path;

use super::theme;
use crate::domain::RenderRecord;

const LINE_WIDTH: usize = 3;
const COMMAND_WIDTH: usize = 3;
const ADDRESS_WIDTH: usize = 8;

/// How listings are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingStyle {
    /// Include the opcode column
    pub show_commands: bool,
    pub color: bool,
}

impl Default for ListingStyle {
    fn default() -> Self {
        Self { show_commands: false, color: true }
    }
}

impl ListingStyle {
    /// One listing row: line number, optional opcode, address, source text
    ///
    /// Absent values are printed as blanks of the column's width, so
    /// satellite rows line up under their primary row.
    #[must_use]
    pub fn format_record(&self, record: &RenderRecord) -> String {
        let line = record
            .line_number
            .map_or_else(|| " ".repeat(LINE_WIDTH), |n| format!("{n:>LINE_WIDTH$}"));
        let address = record
            .address
            .map_or_else(|| " ".repeat(ADDRESS_WIDTH), |a| format!("{a:>ADDRESS_WIDTH$x}"));
        let text = record.source_text.as_deref().unwrap_or("");

        let line = self.paint(line, theme::LINE_NUMBER);
        let address = self.paint(address, theme::ADDRESS);

        if self.show_commands {
            let command = record.command.map_or_else(
                || " ".repeat(COMMAND_WIDTH),
                |c| format!("{:>COMMAND_WIDTH$}", c.opcode()),
            );
            format!("{line} {command} {address} {text}")
        } else {
            format!("{line} {address} {text}")
        }
    }

    /// `path:` heading printed before each file of a directory listing
    #[must_use]
    pub fn format_file_header(&self, path: &Path) -> String {
        self.paint(format!("{}:", path.display()), theme::FILE_HEADER)
    }

    /// Print a whole listing
    ///
    /// # Errors
    /// Returns an error if writing fails
    pub fn write_listing<W: Write>(&self, records: &[RenderRecord], mut out: W) -> io::Result<()> {
        for record in records {
            writeln!(out, "{}", self.format_record(record))?;
        }
        Ok(())
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text
        }
    }
}

/// Print addresses one per line as `0x…`
///
/// # Errors
/// Returns an error if writing fails
pub fn write_addresses<W: Write>(addresses: &[u64], mut out: W) -> io::Result<()> {
    for address in addresses {
        writeln!(out, "{address:#x}")?;
    }
    Ok(())
}
