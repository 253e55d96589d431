/*!
  Renders instruction streams as text for diagnostics, one line per instruction:

  ```text
  0000 OpConstant 1
  0003 OpConstant 2
  ```

  Malformed positions become `ERROR:` lines instead of aborting, because the output is itself
  a diagnostic. An undefined opcode is reported and skipped one byte at a time; a truncated
  tail is reported once and ends the listing. Use `decode_stream()` to fail on the first
  malformed instruction instead.
*/

use std::fmt::Write;

#[cfg(feature = "table")]
use prettytable::{format as TableFormat, Table};
use log::warn;

use super::{Definition, InstructionIter, Operand};
#[cfg(feature = "table")]
use super::stream::hex;
#[cfg(feature = "table")]
use crate::error::CodeError;

/// Disassembles `bytes` into one line per instruction, each terminated by `\n`.
pub fn disassemble(bytes: &[u8]) -> String {
  let mut out = String::new();

  for item in InstructionIter::new(bytes) {
    match item {
      Ok(decoded) => {
        let def = decoded.instruction.opcode.definition();
        let _ = writeln!(
          out, "{:04} {}", decoded.offset, fmt_instruction(&def, &decoded.instruction.operands)
        );
      }
      Err(e) => {
        warn!("disassembly: {}", e);
        let _ = writeln!(out, "ERROR: {}", e);
      }
    }
  }

  out
}

/**
  Formats an opcode and its operands according to the definition's operand count. Only the
  operand counts some opcode actually uses are handled; any other count yields an error
  string so a newly added opcode shows up in listings until it gets a rule here.
*/
pub fn fmt_instruction(def: &Definition, operands: &[Operand]) -> String {
  if operands.len() != def.operand_count() {
    return format!(
      "ERROR: operand len {} does not match defined {}",
      operands.len(), def.operand_count()
    );
  }

  match operands {
    []        => def.name.to_string(),
    [operand] => format!("{} {}", def.name, operand),
    _         => format!("ERROR: unhandled operand count for {}", def.name)
  }
}

#[cfg(feature = "table")]
lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// Lays a stream out as a table of offset, opcode, operands, and raw bytes.
#[cfg(feature = "table")]
pub fn disassembly_table(bytes: &[u8]) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Offset", ubl->"Opcode", ubl->"Operands", ubl->"Bytes"]);

  for item in InstructionIter::new(bytes) {
    match item {

      Ok(decoded) => {
        let operands = decoded.instruction.operands
                              .iter()
                              .map(Operand::to_string)
                              .collect::<Vec<String>>()
                              .join(", ");
        table.add_row(row![
          r->format!("{:04}", decoded.offset),
          decoded.instruction.opcode,
          operands,
          hex(&bytes[decoded.offset..decoded.offset + decoded.width])
        ]);
      }

      Err(e) => {
        let offset = e.offset().unwrap_or_default();
        // A truncated instruction is the tail of the stream, so show all of it.
        let end = match &e {
          CodeError::Malformed { source, .. } if is_truncation(source) => bytes.len(),
          _ => (offset + 1).min(bytes.len())
        };
        table.add_row(row![
          r->format!("{:04}", offset),
          "ERROR",
          e,
          hex(&bytes[offset..end])
        ]);
      }

    } // end match on item
  } // end for
  table
}

#[cfg(feature = "table")]
fn is_truncation(error: &CodeError) -> bool {
  match error {
    CodeError::TruncatedInstruction { .. } => true,
    _ => false
  }
}
