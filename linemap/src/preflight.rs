//! Pre-flight checks for linemap
//!
//! Validates the target binary before decoding it, with clear, actionable
//! error messages when it cannot be used.

use anyhow::{bail, Context, Result};
use object::{Object, ObjectSection};
use std::path::Path;

/// Run all pre-flight checks before decoding
///
/// # Errors
/// Returns an error if the binary is missing or not a regular file
pub fn run_preflight_checks(binary: &Path, quiet: bool) -> Result<()> {
    check_binary_exists(binary)?;
    check_line_info(binary, quiet)?;
    Ok(())
}

/// Check if the target binary exists and is a regular file
fn check_binary_exists(binary: &Path) -> Result<()> {
    if !binary.exists() {
        bail!(
            "Binary not found: {}\n\n\
             Make sure the path is correct and the binary exists.",
            binary.display()
        );
    }
    if !binary.is_file() {
        bail!(
            "Not a file: {}\n\n\
             --binary must point to an executable or object file, not a directory.",
            binary.display()
        );
    }
    Ok(())
}

/// Warn if the binary carries no line-number information
fn check_line_info(binary: &Path, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }

    let file_data = std::fs::read(binary)
        .with_context(|| format!("Failed to read binary: {}", binary.display()))?;

    let Ok(obj) = object::File::parse(&*file_data) else {
        // Not a valid object file, let the decoder report it
        return Ok(());
    };

    if !has_line_info(&obj) {
        eprintln!("warning: no .debug_line section, the index will be empty (build with -g)");
    }

    Ok(())
}

fn has_line_info(obj: &object::File<'_>) -> bool {
    obj.section_by_name(".debug_line").is_some_and(|s| s.size() > 0)
}
