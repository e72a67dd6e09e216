use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

use crate::debuginfo::CompilationUnitLines;
use crate::domain::{IndexError, LineEntry, SourceFileKey};

/// Entries of one source file, keyed by line number
///
/// Entries under a line keep the order the line programs emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable {
    lines: BTreeMap<u64, Vec<LineEntry>>,
}

impl LineTable {
    /// Entries recorded for `line`, or `None` if the line has none
    #[must_use]
    pub fn get(&self, line: u64) -> Option<&[LineEntry]> {
        self.lines.get(&line).map(Vec::as_slice)
    }

    /// Lines in ascending order with their entries
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[LineEntry])> + '_ {
        self.lines.iter().map(|(line, entries)| (*line, entries.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn entry_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }
}

/// Mapping from source file to per-line address lists
///
/// Built once from every compilation unit of a binary and read-only
/// afterwards. Lookups never create entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressIndex {
    files: BTreeMap<SourceFileKey, LineTable>,
}

/// Rows of one unit grouped by file, in encounter order
struct ResolvedUnit {
    files: Vec<(SourceFileKey, Vec<(u64, LineEntry)>)>,
}

impl AddressIndex {
    /// Build the index from decoded line programs
    ///
    /// Units are merged in slice order and rows in program order; neither
    /// order is ever changed afterwards. `base_address` is added to every
    /// decoded address.
    ///
    /// # Errors
    /// Returns an error if a row references a file or directory outside its
    /// unit's tables, or if relocating an address overflows
    pub fn build(units: &[CompilationUnitLines], base_address: u64) -> Result<Self, IndexError> {
        let mut index = Self::default();
        for (position, unit) in units.iter().enumerate() {
            index.merge(resolve_unit(position, unit, base_address)?);
        }
        index.log_summary(units.len());
        Ok(index)
    }

    /// Build the index, resolving units on up to `jobs` threads
    ///
    /// Produces exactly what [`AddressIndex::build`] produces: resolved units
    /// are merged in unit order regardless of which thread finishes first,
    /// and the reported error is the one of the first failing unit.
    ///
    /// # Errors
    /// Same conditions as [`AddressIndex::build`]
    pub fn build_parallel(
        units: &[CompilationUnitLines],
        base_address: u64,
        jobs: usize,
    ) -> Result<Self, IndexError> {
        let jobs = jobs.clamp(1, units.len().max(1));
        if jobs == 1 {
            return Self::build(units, base_address);
        }

        let chunk_size = units.len().div_ceil(jobs);
        let mut resolved: Vec<Option<Result<ResolvedUnit, IndexError>>> =
            std::iter::repeat_with(|| None).take(units.len()).collect();

        let (tx, rx) = crossbeam_channel::unbounded();
        std::thread::scope(|scope| {
            for (chunk_no, chunk) in units.chunks(chunk_size).enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    for (offset, unit) in chunk.iter().enumerate() {
                        let position = chunk_no * chunk_size + offset;
                        if tx.send((position, resolve_unit(position, unit, base_address))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            for (position, result) in rx {
                resolved[position] = Some(result);
            }
        });
        debug!("Resolved {} units on {jobs} threads", units.len());

        let mut index = Self::default();
        for result in resolved.into_iter().flatten() {
            index.merge(result?);
        }
        index.log_summary(units.len());
        Ok(index)
    }

    /// Per-line table of `key`, or `None` if the file is not indexed
    #[must_use]
    pub fn get(&self, key: &SourceFileKey) -> Option<&LineTable> {
        self.files.get(key)
    }

    /// Entries of one line of one file, or `None` if either is absent
    #[must_use]
    pub fn entries(&self, key: &SourceFileKey, line: u64) -> Option<&[LineEntry]> {
        self.files.get(key).and_then(|table| table.get(line))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SourceFileKey> + '_ {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceFileKey, &LineTable)> + '_ {
        self.files.iter()
    }

    /// Number of distinct source files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of entries across all files and lines
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.files.values().map(LineTable::entry_count).sum()
    }

    /// Append one unit's rows as a contiguous block per file
    fn merge(&mut self, unit: ResolvedUnit) {
        for (key, rows) in unit.files {
            let table = self.files.entry(key).or_default();
            for (line, entry) in rows {
                table.lines.entry(line).or_default().push(entry);
            }
        }
    }

    fn log_summary(&self, unit_count: usize) {
        info!(
            "Indexed {} entries for {} source files from {} compilation units",
            self.entry_count(),
            self.len(),
            unit_count
        );
    }
}

/// Resolve a unit's rows against its own file and directory tables
///
/// Only depends on the unit itself, so units can be resolved in any order
/// or concurrently.
fn resolve_unit(
    position: usize,
    unit: &CompilationUnitLines,
    base_address: u64,
) -> Result<ResolvedUnit, IndexError> {
    let mut files: Vec<(SourceFileKey, Vec<(u64, LineEntry)>)> = Vec::new();
    // file index -> slot in `files`; distinct indexes may share a key
    let mut slot_by_index: HashMap<u64, usize> = HashMap::new();
    let mut slot_by_key: HashMap<SourceFileKey, usize> = HashMap::new();

    for entry in &unit.entries {
        let Some(state) = entry.state else {
            continue;
        };

        let slot = if let Some(&slot) = slot_by_index.get(&state.file) {
            slot
        } else {
            let key = source_key(position, unit, state.file)?;
            let slot = *slot_by_key.entry(key.clone()).or_insert_with(|| {
                files.push((key, Vec::new()));
                files.len() - 1
            });
            slot_by_index.insert(state.file, slot);
            slot
        };

        let address = state
            .address
            .checked_add(base_address)
            .ok_or(IndexError::AddressOverflow { address: state.address, base: base_address })?;
        files[slot].1.push((state.line, LineEntry { command: entry.command, address }));
    }

    debug!(
        "unit {position} ({}): {} files referenced",
        unit.name.as_deref().unwrap_or("<unnamed>"),
        files.len()
    );
    Ok(ResolvedUnit { files })
}

fn source_key(
    position: usize,
    unit: &CompilationUnitLines,
    file_index: u64,
) -> Result<SourceFileKey, IndexError> {
    let file = usize::try_from(file_index)
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| unit.files.get(index))
        .ok_or_else(|| IndexError::MalformedDebugInfo {
            unit: position,
            detail: format!(
                "file index {file_index} outside file table of {} entries",
                unit.files.len()
            ),
        })?;

    let directory = usize::try_from(file.directory_index)
        .ok()
        .and_then(|index| unit.directories.get(index))
        .ok_or_else(|| IndexError::MalformedDebugInfo {
            unit: position,
            detail: format!(
                "file {} uses directory index {} outside directory table of {} entries",
                file.name,
                file.directory_index,
                unit.directories.len()
            ),
        })?;

    Ok(SourceFileKey::new(directory.clone(), file.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debuginfo::{FileEntry, LineProgramEntry};
    use crate::domain::LineCommand;

    fn unit(
        directories: &[&str],
        files: &[(&str, u64)],
        entries: Vec<LineProgramEntry>,
    ) -> CompilationUnitLines {
        CompilationUnitLines {
            name: None,
            directories: directories.iter().map(ToString::to_string).collect(),
            files: files.iter().map(|(name, dir)| FileEntry::new(*name, *dir)).collect(),
            entries,
        }
    }

    fn row(file: u64, line: u64, address: u64) -> LineProgramEntry {
        LineProgramEntry::row(LineCommand::COPY, file, line, address)
    }

    fn addresses(index: &AddressIndex, key: &SourceFileKey, line: u64) -> Vec<u64> {
        index.entries(key, line).unwrap_or_default().iter().map(|e| e.address).collect()
    }

    #[test]
    fn test_single_row_lands_under_compilation_directory() {
        let units = [unit(&["."], &[("main.c", 0)], vec![row(1, 10, 0x40_0100)])];
        let index = AddressIndex::build(&units, 0).unwrap();

        let key = SourceFileKey::new(".", "main.c");
        assert_eq!(addresses(&index, &key, 10), vec![0x40_0100]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn test_order_is_unit_then_program_order() {
        // Addresses deliberately descend so any sorting would show
        let first = unit(
            &[".", "src"],
            &[("a.c", 1)],
            vec![row(1, 5, 0x300), row(1, 5, 0x100), row(1, 6, 0x50)],
        );
        let second = unit(&[".", "src"], &[("a.c", 1)], vec![row(1, 5, 0x200), row(1, 5, 0x10)]);
        let index = AddressIndex::build(&[first, second], 0).unwrap();

        let key = SourceFileKey::new("src", "a.c");
        assert_eq!(addresses(&index, &key, 5), vec![0x300, 0x100, 0x200, 0x10]);
        assert_eq!(addresses(&index, &key, 6), vec![0x50]);
    }

    #[test]
    fn test_duplicate_entries_are_kept() {
        let units = [unit(&["."], &[("loop.c", 0)], vec![row(1, 3, 0x10), row(1, 3, 0x10)])];
        let index = AddressIndex::build(&units, 0).unwrap();
        assert_eq!(addresses(&index, &SourceFileKey::new(".", "loop.c"), 3), vec![0x10, 0x10]);
    }

    #[test]
    fn test_commands_are_preserved() {
        let units = [unit(
            &["."],
            &[("a.c", 0)],
            vec![
                LineProgramEntry::row(LineCommand::Special(0x4b), 1, 2, 0x10),
                LineProgramEntry::row(LineCommand::END_SEQUENCE, 1, 2, 0x18),
            ],
        )];
        let index = AddressIndex::build(&units, 0).unwrap();
        let commands: Vec<LineCommand> = index
            .entries(&SourceFileKey::new(".", "a.c"), 2)
            .unwrap()
            .iter()
            .map(|e| e.command)
            .collect();
        assert_eq!(commands, vec![LineCommand::Special(0x4b), LineCommand::END_SEQUENCE]);
    }

    #[test]
    fn test_textually_different_directories_stay_separate() {
        let units = [
            unit(&[".", "src"], &[("a.c", 1)], vec![row(1, 1, 0x10)]),
            unit(&[".", "./src"], &[("a.c", 1)], vec![row(1, 1, 0x20)]),
        ];
        let index = AddressIndex::build(&units, 0).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_file_indexes_sharing_a_key_keep_relative_order() {
        let units = [unit(
            &["."],
            &[("a.c", 0), ("a.c", 0)],
            vec![row(1, 1, 0x30), row(2, 1, 0x20), row(1, 1, 0x10)],
        )];
        let index = AddressIndex::build(&units, 0).unwrap();
        assert_eq!(addresses(&index, &SourceFileKey::new(".", "a.c"), 1), vec![0x30, 0x20, 0x10]);
    }

    #[test]
    fn test_rows_without_state_are_skipped() {
        let units = [unit(
            &["."],
            &[("a.c", 0)],
            vec![
                LineProgramEntry::no_row(LineCommand::Extended(2)),
                LineProgramEntry::no_row(LineCommand::Standard(4)),
                row(1, 7, 0x70),
            ],
        )];
        let index = AddressIndex::build(&units, 0).unwrap();
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn test_base_address_shifts_every_address() {
        let units = [unit(&["."], &[("a.c", 0)], vec![row(1, 1, 0x10), row(1, 2, 0x20)])];
        let unshifted = AddressIndex::build(&units, 0x1000).unwrap();
        let shifted = AddressIndex::build(&units, 0x5000).unwrap();

        let key = SourceFileKey::new(".", "a.c");
        assert_eq!(addresses(&unshifted, &key, 1), vec![0x1010]);
        for line in [1, 2] {
            let before = addresses(&unshifted, &key, line);
            let after = addresses(&shifted, &key, line);
            for (b, a) in before.iter().zip(&after) {
                assert_eq!(a - b, 0x4000);
            }
        }
    }

    #[test]
    fn test_address_overflow_is_fatal() {
        let units = [unit(&["."], &[("a.c", 0)], vec![row(1, 1, u64::MAX - 1)])];
        let err = AddressIndex::build(&units, 0x10).unwrap_err();
        assert!(matches!(err, IndexError::AddressOverflow { .. }));
    }

    #[test]
    fn test_file_index_out_of_range_is_fatal() {
        let units = [
            unit(&["."], &[("a.c", 0)], vec![row(1, 1, 0x10)]),
            unit(&["."], &[("b.c", 0)], vec![row(2, 1, 0x20)]),
        ];
        let err = AddressIndex::build(&units, 0).unwrap_err();
        match err {
            IndexError::MalformedDebugInfo { unit, detail } => {
                assert_eq!(unit, 1);
                assert!(detail.contains("file index 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_index_zero_is_fatal() {
        let units = [unit(&["."], &[("a.c", 0)], vec![row(0, 1, 0x10)])];
        assert!(matches!(
            AddressIndex::build(&units, 0),
            Err(IndexError::MalformedDebugInfo { unit: 0, .. })
        ));
    }

    #[test]
    fn test_largest_file_index_is_fatal() {
        let units = [unit(&["."], &[("a.c", 0)], vec![row(u64::MAX, 1, 0x10)])];
        assert!(matches!(
            AddressIndex::build(&units, 0),
            Err(IndexError::MalformedDebugInfo { unit: 0, .. })
        ));
    }

    #[test]
    fn test_directory_index_out_of_range_is_fatal() {
        let units = [unit(&["."], &[("a.c", 3)], vec![row(1, 1, 0x10)])];
        let err = AddressIndex::build(&units, 0).unwrap_err();
        assert!(err.to_string().contains("directory index 3"));
    }

    #[test]
    fn test_unreferenced_bad_file_entry_is_ignored() {
        let units = [unit(&["."], &[("a.c", 0), ("broken.c", 9)], vec![row(1, 1, 0x10)])];
        assert!(AddressIndex::build(&units, 0).is_ok());
    }

    #[test]
    fn test_lookups_never_create_entries() {
        let units = [unit(&["."], &[("a.c", 0)], vec![row(1, 1, 0x10)])];
        let index = AddressIndex::build(&units, 0).unwrap();
        let before = index.clone();

        let missing = SourceFileKey::new(".", "missing.c");
        assert!(index.get(&missing).is_none());
        assert!(index.entries(&missing, 1).is_none());
        assert!(index.entries(&SourceFileKey::new(".", "a.c"), 99).is_none());
        assert_eq!(index, before);
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let units: Vec<CompilationUnitLines> = (0..9u64)
            .map(|n| {
                unit(
                    &[".", "src", "include"],
                    &[("shared.h", 2), ("own.c", 1)],
                    vec![row(1, 1, 0x1000 - n), row(2, n, 0x100 * n), row(1, 1, 0x10 * n)],
                )
            })
            .collect();

        let sequential = AddressIndex::build(&units, 0x40).unwrap();
        for jobs in [0, 1, 2, 4, 16] {
            assert_eq!(AddressIndex::build_parallel(&units, 0x40, jobs).unwrap(), sequential);
        }
    }

    #[test]
    fn test_parallel_build_reports_first_failing_unit() {
        let mut units: Vec<CompilationUnitLines> =
            (0..6).map(|_| unit(&["."], &[("a.c", 0)], vec![row(1, 1, 0x10)])).collect();
        units[2].entries.push(row(5, 1, 0x20));
        units[4].entries.push(row(7, 1, 0x20));

        let err = AddressIndex::build_parallel(&units, 0, 3).unwrap_err();
        assert!(matches!(err, IndexError::MalformedDebugInfo { unit: 2, .. }));
    }
}
