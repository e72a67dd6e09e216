use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::LineCommand;
use crate::index::AddressIndex;

/// `[opcode, "0x…"]` pair of a dumped entry
pub type DumpEntry = (LineCommand, String);

/// Structural export of a whole [`AddressIndex`]
///
/// Keys are `directory/filename`; each maps line numbers to the line's
/// entries in index order, addresses rendered as `0x`-prefixed lower-case
/// hexadecimal. Serializes as a plain nested JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexDump {
    pub files: BTreeMap<String, BTreeMap<u64, Vec<DumpEntry>>>,
}

impl IndexDump {
    #[must_use]
    pub fn from_index(index: &AddressIndex) -> Self {
        let mut files: BTreeMap<String, BTreeMap<u64, Vec<DumpEntry>>> = BTreeMap::new();
        for (key, table) in index.iter() {
            // Distinct keys can render to the same string; their lines merge
            let lines = files.entry(key.to_string()).or_default();
            for (line, entries) in table.iter() {
                lines
                    .entry(line)
                    .or_default()
                    .extend(entries.iter().map(|e| (e.command, format!("{:#x}", e.address))));
            }
        }
        Self { files }
    }

    /// Entries dumped for `file` (as `directory/filename`) and `line`
    #[must_use]
    pub fn get(&self, file: &str, line: u64) -> Option<&[DumpEntry]> {
        self.files.get(file).and_then(|lines| lines.get(&line)).map(Vec::as_slice)
    }
}
