/*!
  This module is responsible for the encoding and decoding of binary instructions.

  An instruction is its opcode byte followed by each operand, big-endian, at the width its
  `Definition` declares:

  ```text
  [OpCode:8][Operand:8*w0][Operand:8*w1]...
  ```

  Both directions check their preconditions. The encoder rejects a wrong operand count or a
  value that does not fit its width, and the decoder rejects an operand region shorter than
  the definition requires. Nothing is ever truncated or over-read.
*/

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};

use super::{lookup, Definition, Opcode, Operand};
use crate::error::CodeError;

/// Largest operand width in bytes that fits in an `Operand`.
pub const MAX_OPERAND_WIDTH: usize = std::mem::size_of::<Operand>();

/// Encodes one instruction for `opcode`.
pub fn make(opcode: Opcode, operands: &[Operand]) -> Result<Vec<u8>, CodeError> {
  encode_with(&opcode.definition(), operands)
}

/**
  Encodes one instruction from a raw tag. Unlike `make`, the tag may be unregistered, in
  which case this fails with `CodeError::UndefinedOpcode`.
*/
pub fn make_raw(tag: u8, operands: &[Operand]) -> Result<Vec<u8>, CodeError> {
  encode_with(lookup(tag)?, operands)
}

/// Encodes an instruction described by `def`. The buffer has exactly `def.width()` bytes.
pub fn encode_with(def: &Definition, operands: &[Operand]) -> Result<Vec<u8>, CodeError> {
  if operands.len() != def.operand_count() {
    return Err(CodeError::OperandCountMismatch {
      opcode   : def.name,
      expected : def.operand_count(),
      given    : operands.len(),
    });
  }

  let mut instruction = vec![0u8; def.width()];
  instruction[0] = def.opcode.code();

  let mut offset = 1;
  for (&operand, &width) in operands.iter().zip(def.operand_widths) {
    if !fits(operand, width) {
      return Err(CodeError::OperandOverflow { opcode: def.name, value: operand, width });
    }
    write_operand(&mut instruction[offset..offset + width], operand);
    offset += width;
  }

  trace!("encoded {} {:?} as {:02X?}", def.name, operands, instruction);
  Ok(instruction)
}

/**
  Decodes the operands of one instruction. `bytes` starts just after the opcode byte and may
  extend past the instruction. Returns the operands and the number of bytes they occupy, so
  the next instruction starts `1 + consumed` bytes after this one's opcode.
*/
pub fn read_operands(def: &Definition, bytes: &[u8]) -> Result<(Vec<Operand>, usize), CodeError> {
  let needed = def.operands_width();
  if bytes.len() < needed {
    debug!("{} needs {} operand bytes, found {}", def.name, needed, bytes.len());
    return Err(CodeError::TruncatedInstruction { needed, available: bytes.len() });
  }

  let mut operands = Vec::with_capacity(def.operand_count());
  let mut offset = 0;
  for &width in def.operand_widths {
    operands.push(read_operand(&bytes[offset..], width));
    offset += width;
  }

  Ok((operands, offset))
}

/// Decodes the first two bytes of `bytes` as a big-endian `u16`, without a registry lookup.
pub fn read_u16(bytes: &[u8]) -> Result<u16, CodeError> {
  match bytes.len() < 2 {
    true  => Err(CodeError::TruncatedInstruction { needed: 2, available: bytes.len() }),
    false => Ok(BigEndian::read_u16(bytes))
  }
}

// Widths past `MAX_OPERAND_WIDTH` are zero-padded on the left.
fn write_operand(slot: &mut [u8], operand: Operand) {
  match slot.len() {
    0 => {},
    w if w > MAX_OPERAND_WIDTH => BigEndian::write_u64(&mut slot[w - MAX_OPERAND_WIDTH..], operand),
    w => BigEndian::write_uint(slot, operand, w)
  }
}

// The caller guarantees `bytes` holds at least `width` bytes.
fn read_operand(bytes: &[u8], width: usize) -> Operand {
  match width {
    0 => 0,
    w if w > MAX_OPERAND_WIDTH => BigEndian::read_u64(&bytes[w - MAX_OPERAND_WIDTH..w]),
    w => BigEndian::read_uint(bytes, w)
  }
}

fn fits(value: Operand, width: usize) -> bool {
  match width {
    0 => value == 0,
    w if w >= MAX_OPERAND_WIDTH => true,
    w => value >> (8 * w) == 0
  }
}
