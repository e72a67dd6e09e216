use std::fs;

use linemap::debuginfo::{CompilationUnitLines, FileEntry, LineProgramEntry};
use linemap::domain::{LineCommand, QueryError};
use linemap::export::write_json;
use linemap::index::AddressIndex;
use linemap::query::QueryEngine;

fn unit(directories: &[&str], files: &[(&str, u64)], rows: &[(u64, u64, u64)]) -> CompilationUnitLines {
    CompilationUnitLines {
        name: None,
        directories: directories.iter().map(ToString::to_string).collect(),
        files: files.iter().map(|(name, dir)| FileEntry::new(*name, *dir)).collect(),
        entries: rows
            .iter()
            .map(|&(file, line, address)| LineProgramEntry::row(LineCommand::COPY, file, line, address))
            .collect(),
    }
}

#[test]
fn test_single_row_unit() {
    let units = vec![unit(&["."], &[("main.c", 0)], &[(1, 10, 0x40_0100)])];
    let index = AddressIndex::build(&units, 0).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    assert_eq!(engine.addresses_for_file_line("main.c".as_ref(), 10).unwrap(), vec![0x40_0100]);
    assert_eq!(engine.addresses_for_file_line("main.c".as_ref(), 11).unwrap(), Vec::<u64>::new());
}

#[test]
fn test_base_address_relocates_every_entry() {
    let units = vec![unit(&["."], &[("main.c", 0)], &[(1, 10, 0x100), (1, 10, 0x108)])];
    let index = AddressIndex::build(&units, 0x5555_0000).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    assert_eq!(
        engine.addresses_for_file_line("main.c".as_ref(), 10).unwrap(),
        vec![0x5555_0100, 0x5555_0108]
    );
}

#[test]
fn test_unknown_file_is_reported_not_fatal() {
    let units = vec![unit(&["."], &[("main.c", 0)], &[(1, 10, 0x100)])];
    let index = AddressIndex::build(&units, 0).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    let err = engine.addresses_for_file_line("other.c".as_ref(), 10).unwrap_err();
    assert!(matches!(err, QueryError::FileNotReferenced(_)));
    assert_eq!(err.to_string(), "other.c is not referenced in the executable");

    // The engine keeps answering afterwards
    assert!(engine.addresses_for_file_line("main.c".as_ref(), 10).is_ok());
}

#[test]
fn test_recorded_filename_with_directories_does_not_shadow_bare_name() {
    let units = vec![unit(&[".", "/build"], &[("x.c", 1), ("src/x.c", 1)], &[(1, 4, 0x10), (2, 9, 0x80)])];
    let index = AddressIndex::build(&units, 0).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    assert_eq!(engine.addresses_for_file_line("x.c".as_ref(), 4).unwrap(), vec![0x10]);
    assert_eq!(engine.addresses_for_file_line("/build/src/x.c".as_ref(), 9).unwrap(), Vec::<u64>::new());
}

#[test]
fn test_json_dump_of_two_units() {
    let units = vec![
        unit(&[".", "/src/app"], &[("main.c", 1)], &[(1, 3, 0x10)]),
        unit(&[".", "/src/app"], &[("util.c", 1)], &[(1, 7, 0x20)]),
    ];
    let index = AddressIndex::build(&units, 0).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    let mut buffer = Vec::new();
    write_json(&engine.dump_all(), &mut buffer).expect("Failed to write dump");

    let parsed: serde_json::Value = serde_json::from_slice(&buffer).expect("Invalid JSON");
    assert_eq!(parsed["/src/app/main.c"]["3"][0][1], "0x10");
    assert_eq!(parsed["/src/app/util.c"]["7"][0][1], "0x20");
    assert_eq!(parsed["/src/app/main.c"]["3"][0][0], u64::from(LineCommand::COPY.opcode()));
}

#[test]
fn test_render_directory_over_source_tree() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(root.path().join("src")).unwrap();
    fs::write(root.path().join("src/main.c"), "int main(void) {\n  return 0;\n}\n").unwrap();

    let units = vec![unit(
        &[".", "src", "lib"],
        &[("main.c", 1), ("gone.c", 2)],
        &[(1, 1, 0x10), (1, 2, 0x14), (1, 2, 0x18), (2, 1, 0x40)],
    )];
    let index = AddressIndex::build(&units, 0).expect("Failed to build index");
    let engine = QueryEngine::new(&index);

    let entries: Vec<_> = engine.render_directory(root.path()).collect();
    assert_eq!(entries.len(), 2);

    let main = entries
        .iter()
        .find(|entry| entry.path.ends_with("src/main.c"))
        .expect("main.c not listed");
    let records = main.outcome.as_ref().expect("main.c failed to render");
    let addresses: Vec<_> = records.iter().map(|r| r.address).collect();
    assert_eq!(addresses, vec![Some(0x10), Some(0x14), Some(0x18), None]);
    assert!(records[2].is_satellite());

    let gone = entries
        .iter()
        .find(|entry| entry.path.ends_with("lib/gone.c"))
        .expect("gone.c not listed");
    assert!(matches!(gone.outcome, Err(QueryError::SourceUnavailable { .. })));
}
