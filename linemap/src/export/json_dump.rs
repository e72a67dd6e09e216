use std::io::Write;

use crate::domain::ExportError;
use crate::query::IndexDump;

/// Write `dump` as a single JSON object
///
/// ```text
/// {"src/main.c": {"10": [[1, "0x401000"], [75, "0x401004"]]}}
/// ```
///
/// Line numbers become object keys, so they appear as strings. Each entry is
/// an `[opcode, address]` pair in index order.
///
/// # Errors
/// Returns an error if serialization or the underlying writer fails
pub fn write_json<W: Write>(dump: &IndexDump, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer(&mut writer, dump)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
