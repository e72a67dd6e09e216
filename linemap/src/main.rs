//! # linemap - Main Entry Point
//!
//! Decodes the line-number program of a binary once, builds the address
//! index, then answers every query requested on the command line:
//! - **Dump** (`--json-db`): the whole index as JSON on stdout
//! - **File** (`--file`, optionally `--line`): an annotated listing, or the
//!   addresses of one line
//! - **Directory** (`--directory`): listings for every indexed file under a
//!   source root
//! - **Reverse** (`--address`): the source location of runtime addresses

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use linemap::cli::Args;
use linemap::debuginfo::load_line_programs;
use linemap::display::{write_addresses, ListingStyle};
use linemap::domain::{IndexError, QueryError};
use linemap::export::write_json;
use linemap::index::{parse_base_address, AddressIndex};
use linemap::preflight::run_preflight_checks;
use linemap::query::QueryEngine;
use linemap::symbolization::Symbolizer;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(IndexError::InvalidBaseAddress(_)) = err.downcast_ref::<IndexError>() {
        return EXIT_USAGE;
    }
    if err.to_string().contains("no query given") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if !args.has_query() {
        anyhow::bail!("no query given, use --json-db, --file, --directory or --address");
    }

    // Checked before the binary is touched
    let base_address = parse_base_address(&args.base_address)?;
    let reverse_addresses = args
        .addresses
        .iter()
        .map(|raw| parse_base_address(raw))
        .collect::<Result<Vec<_>, _>>()?;

    run_preflight_checks(&args.binary, args.quiet)?;

    let units = load_line_programs(&args.binary)?;
    let index = AddressIndex::build_parallel(&units, base_address, args.jobs)?;
    drop(units);

    let engine = QueryEngine::new(&index);
    let style = ListingStyle {
        show_commands: args.dwarf,
        color: !args.no_color && io::stdout().is_terminal(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.json_db {
        write_json(&engine.dump_all(), &mut out).context("Failed to write JSON dump")?;
    }

    if let Some(ref file) = args.file {
        let path = absolute(file)?;
        let outcome = match args.line {
            Some(line) => engine
                .addresses_for_file_line(&path, line)
                .map(|addresses| write_addresses(&addresses, &mut out)),
            None => engine
                .render_file(&path)
                .map(|records| style.write_listing(&records, &mut out)),
        };
        report(outcome, &mut out)?;
    }

    if let Some(ref directory) = args.directory {
        let root = absolute(directory)?;
        let mut listed = 0usize;
        for entry in engine.render_directory(&root) {
            writeln!(out, "{}", style.format_file_header(&entry.path))?;
            let outcome = entry.outcome.map(|records| style.write_listing(&records, &mut out));
            if matches!(outcome, Ok(Ok(()))) {
                listed += 1;
            }
            report(outcome, &mut out)?;
            writeln!(out)?;
        }
        info!("Listed {listed} of {} files under {}", index.len(), root.display());
    }

    if !reverse_addresses.is_empty() {
        let symbolizer = Symbolizer::new(&args.binary)?;
        for address in reverse_addresses {
            let Some(file_address) = address.checked_sub(base_address) else {
                writeln!(out, "{address:#x} ?? (below base address {base_address:#x})")?;
                continue;
            };
            debug!("Resolving {address:#x} as {file_address:#x}");
            writeln!(out, "{}", symbolizer.resolve(file_address).format(address))?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Print a query failure and carry on; only write errors are fatal
fn report<W: Write>(outcome: Result<io::Result<()>, QueryError>, out: &mut W) -> Result<()> {
    match outcome {
        Ok(written) => written.context("Failed to write output"),
        Err(err) => {
            out.flush()?;
            eprintln!("{err}");
            Ok(())
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}
