use anyhow::{Context as _, Result};
use gimli::{EndianRcSlice, LineInstruction, Reader as _, RunTimeEndian};
use log::{debug, info};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::fs;
use std::num::NonZeroU64;
use std::path::Path;
use std::rc::Rc;

use super::line_program::{CompilationUnitLines, FileEntry, LineProgramEntry};
use crate::domain::LineCommand;

type DwarfReader = EndianRcSlice<RunTimeEndian>;

/// Decode the line-number program of every compilation unit in a binary
///
/// Units come back in `.debug_info` order. A binary without line information
/// yields an empty list rather than an error.
///
/// # Errors
/// Returns an error if the binary cannot be read or parsed, or if its DWARF
/// is corrupt
pub fn load_line_programs<P: AsRef<Path>>(binary_path: P) -> Result<Vec<CompilationUnitLines>> {
    let binary_path = binary_path.as_ref();
    let binary_data = fs::read(binary_path)
        .with_context(|| format!("Failed to read binary file {}", binary_path.display()))?;

    let obj_file = object::File::parse(&*binary_data).context("Failed to parse object file")?;

    let endian =
        if obj_file.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };

    let load_section = |id: gimli::SectionId| -> Result<DwarfReader, gimli::Error> {
        let data = obj_file
            .section_by_name(id.name())
            .and_then(|section| section.uncompressed_data().ok())
            .unwrap_or(Cow::Borrowed(&[][..]));
        Ok(EndianRcSlice::new(Rc::from(&*data), endian))
    };

    let dwarf = gimli::Dwarf::load(&load_section).context("Failed to load DWARF sections")?;

    let mut units = Vec::new();
    let mut headers = dwarf.units();
    while let Some(header) = headers.next().context("Failed to read unit header")? {
        let unit = dwarf.unit(header).context("Failed to parse compilation unit")?;
        if let Some(lines) = decode_unit(&dwarf, &unit)? {
            debug!(
                "unit {}: {} files, {} instructions",
                lines.name.as_deref().unwrap_or("<unnamed>"),
                lines.files.len(),
                lines.entries.len()
            );
            units.push(lines);
        }
    }

    info!("Decoded line programs for {} compilation units", units.len());
    Ok(units)
}

/// Run one unit's line program, recording each instruction
fn decode_unit(
    dwarf: &gimli::Dwarf<DwarfReader>,
    unit: &gimli::Unit<DwarfReader>,
) -> Result<Option<CompilationUnitLines>> {
    let Some(mut program) = unit.line_program.clone() else {
        return Ok(None);
    };

    let version = program.header().version();
    let tombstone = tombstone_address(program.header().address_size());
    let mut entries = Vec::new();
    let mut row = gimli::LineRow::new(program.header());
    let mut instructions = program.header().instructions();

    while let Some(instruction) = instructions
        .next_instruction(program.header())
        .context("Failed to decode line program instruction")?
    {
        let command = command_of(&instruction);
        if !row.execute(instruction, &mut program).context("Failed to execute line program")? {
            entries.push(LineProgramEntry::no_row(command));
            continue;
        }

        if row.address() == tombstone {
            entries.push(LineProgramEntry::no_row(command));
        } else {
            let file = normalized_file_index(row.file_index(), version);
            let line = row.line().map_or(0, NonZeroU64::get);
            entries.push(LineProgramEntry::row(command, file, line, row.address()));
        }
        row.reset(program.header());
    }

    // Snapshot after execution so DW_LNE_define_file entries are included
    let header = program.header();
    let mut directories = vec![".".to_string()];
    // DWARF 5 lists the compilation directory explicitly at index 0
    let skip = usize::from(version >= 5);
    for directory in header.include_directories().iter().skip(skip) {
        directories.push(attr_to_string(dwarf, unit, directory.clone())?);
    }

    let files = header
        .file_names()
        .iter()
        .map(|file| {
            Ok(FileEntry::new(attr_to_string(dwarf, unit, file.path_name())?, file.directory_index()))
        })
        .collect::<Result<Vec<_>>>()?;

    let name = match unit.name.as_ref() {
        Some(name) => Some(name.to_string_lossy()?.into_owned()),
        None => None,
    };

    Ok(Some(CompilationUnitLines { name, directories, files, entries }))
}

fn attr_to_string(
    dwarf: &gimli::Dwarf<DwarfReader>,
    unit: &gimli::Unit<DwarfReader>,
    value: gimli::AttributeValue<DwarfReader>,
) -> Result<String> {
    let raw = dwarf.attr_string(unit, value).context("Failed to read line table string")?;
    Ok(raw.to_string_lossy()?.into_owned())
}

/// File index in the 1-based numbering of DWARF 4
///
/// DWARF 5 numbers files from 0. An index that cannot be shifted stays out
/// of range so the index builder rejects it.
fn normalized_file_index(file_index: u64, version: u16) -> u64 {
    if version >= 5 {
        file_index.checked_add(1).unwrap_or(u64::MAX)
    } else {
        file_index
    }
}

/// Address the linker writes for code it discarded
fn tombstone_address(address_size: u8) -> u64 {
    let bits = 8 * u32::from(address_size.clamp(1, 8));
    u64::MAX >> (64 - bits)
}

/// Opcode of the instruction, as it appears in the encoded program
fn command_of<R: gimli::Reader>(instruction: &LineInstruction<R>) -> LineCommand {
    use gimli::constants as dw;

    match *instruction {
        LineInstruction::Special(opcode) => LineCommand::Special(opcode),
        LineInstruction::Copy => LineCommand::Standard(dw::DW_LNS_copy.0),
        LineInstruction::AdvancePc(_) => LineCommand::Standard(dw::DW_LNS_advance_pc.0),
        LineInstruction::AdvanceLine(_) => LineCommand::Standard(dw::DW_LNS_advance_line.0),
        LineInstruction::SetFile(_) => LineCommand::Standard(dw::DW_LNS_set_file.0),
        LineInstruction::SetColumn(_) => LineCommand::Standard(dw::DW_LNS_set_column.0),
        LineInstruction::NegateStatement => LineCommand::Standard(dw::DW_LNS_negate_stmt.0),
        LineInstruction::SetBasicBlock => LineCommand::Standard(dw::DW_LNS_set_basic_block.0),
        LineInstruction::ConstAddPc => LineCommand::Standard(dw::DW_LNS_const_add_pc.0),
        LineInstruction::FixedAddPc(_) => LineCommand::Standard(dw::DW_LNS_fixed_advance_pc.0),
        LineInstruction::SetPrologueEnd => LineCommand::Standard(dw::DW_LNS_set_prologue_end.0),
        LineInstruction::SetEpilogueBegin => {
            LineCommand::Standard(dw::DW_LNS_set_epilogue_begin.0)
        }
        LineInstruction::SetIsa(_) => LineCommand::Standard(dw::DW_LNS_set_isa.0),
        LineInstruction::UnknownStandard0(opcode)
        | LineInstruction::UnknownStandard1(opcode, _)
        | LineInstruction::UnknownStandardN(opcode, _) => LineCommand::Standard(opcode.0),
        LineInstruction::EndSequence => LineCommand::Extended(dw::DW_LNE_end_sequence.0),
        LineInstruction::SetAddress(_) => LineCommand::Extended(dw::DW_LNE_set_address.0),
        LineInstruction::DefineFile(_) => LineCommand::Extended(dw::DW_LNE_define_file.0),
        LineInstruction::SetDiscriminator(_) => {
            LineCommand::Extended(dw::DW_LNE_set_discriminator.0)
        }
        LineInstruction::UnknownExtended(opcode, _) => LineCommand::Extended(opcode.0),
    }
}
