/*!
  Instruction streams. `Instructions` is the append-only buffer a compiler emits into, and
  `InstructionIter` walks any byte slice one instruction at a time. Instruction boundaries are
  recoverable only by looking up each opcode's definition, so the iterator is the one place
  that moves a cursor across a stream; the disassembler and the table listing are built on it.
*/

use std::fmt::{Display, Formatter};

use super::{lookup, make, read_operands, Instruction, Opcode, Operand};
use super::disassembly::disassemble;
use crate::error::CodeError;

/// An instruction recovered from a stream, with where it starts and how many bytes it spans.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Decoded {
  pub offset      : usize,
  pub instruction : Instruction,
  pub width       : usize,
}

/// An owned, append-only stream of complete instructions.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Instructions {
  bytes: Vec<u8>,
}

impl Instructions {
  pub fn new() -> Instructions {
    Instructions { bytes: vec![] }
  }

  pub fn with_capacity(capacity: usize) -> Instructions {
    Instructions { bytes: Vec::with_capacity(capacity) }
  }

  /// Wraps bytes produced elsewhere. They are not validated; walk them with `iter()` or
  /// `decode_stream()` to find malformed instructions.
  pub fn from_bytes(bytes: Vec<u8>) -> Instructions {
    Instructions { bytes }
  }

  /// Appends one encoded instruction and returns its offset. On error nothing is appended.
  pub fn emit(&mut self, opcode: Opcode, operands: &[Operand]) -> Result<usize, CodeError> {
    let instruction = make(opcode, operands)?;
    let offset = self.bytes.len();
    self.bytes.extend_from_slice(&instruction);
    Ok(offset)
  }

  pub fn push(&mut self, instruction: &Instruction) -> Result<usize, CodeError> {
    self.emit(instruction.opcode, &instruction.operands)
  }

  pub fn extend(&mut self, other: &Instructions) {
    self.bytes.extend_from_slice(&other.bytes);
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  pub fn iter(&self) -> InstructionIter<'_> {
    InstructionIter::new(&self.bytes)
  }

  /// Space separated uppercase hex, e.g. `00 FF FE`.
  pub fn hex(&self) -> String {
    hex(&self.bytes)
  }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
  bytes.iter()
       .map(|byte| format!("{:02X}", byte))
       .collect::<Vec<String>>()
       .join(" ")
}

impl AsRef<[u8]> for Instructions {
  fn as_ref(&self) -> &[u8] {
    &self.bytes
  }
}

impl From<Vec<u8>> for Instructions {
  fn from(bytes: Vec<u8>) -> Instructions {
    Instructions::from_bytes(bytes)
  }
}

impl<'a> IntoIterator for &'a Instructions {
  type Item = Result<Decoded, CodeError>;
  type IntoIter = InstructionIter<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl Display for Instructions {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", disassemble(&self.bytes))
  }
}

/**
  Walks a byte stream instruction by instruction. Errors are wrapped in
  `CodeError::Malformed` with the offset of the offending byte. An undefined opcode skips
  exactly one byte and iteration continues; a truncated instruction ends iteration, since no
  complete instruction can follow it. Every step therefore advances or stops.
*/
pub struct InstructionIter<'a> {
  bytes  : &'a [u8],
  cursor : usize,
}

impl<'a> InstructionIter<'a> {
  pub fn new(bytes: &'a [u8]) -> InstructionIter<'a> {
    InstructionIter { bytes, cursor: 0 }
  }

  /// Offset of the next byte to be read.
  pub fn offset(&self) -> usize {
    self.cursor
  }
}

impl<'a> Iterator for InstructionIter<'a> {
  type Item = Result<Decoded, CodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.cursor;
    let tag = *self.bytes.get(offset)?;

    let def = match lookup(tag) {
      Ok(def) => def,
      Err(e) => {
        self.cursor += 1;
        return Some(Err(e.at(offset)));
      }
    };

    match read_operands(def, &self.bytes[offset + 1..]) {
      Ok((operands, consumed)) => {
        self.cursor += 1 + consumed;
        Some(Ok(Decoded {
          offset,
          instruction: Instruction::new(def.opcode, operands),
          width: 1 + consumed,
        }))
      }
      Err(e) => {
        self.cursor = self.bytes.len();
        Some(Err(e.at(offset)))
      }
    }
  }
}

/// Decodes a whole stream, aborting at the first malformed instruction.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Decoded>, CodeError> {
  InstructionIter::new(bytes).collect()
}


#[cfg(test)]
mod tests {
  use super::*;

  fn constants(values: &[Operand]) -> Instructions {
    let mut instructions = Instructions::new();
    for &value in values {
      instructions.emit(Opcode::Constant, &[value]).unwrap();
    }
    instructions
  }

  #[test]
  fn emit_returns_offsets(){
    let mut instructions = Instructions::new();
    assert_eq!(instructions.emit(Opcode::Constant, &[1]), Ok(0));
    assert_eq!(instructions.emit(Opcode::Constant, &[2]), Ok(3));
    assert_eq!(instructions.as_bytes(), &[0x00, 0x00, 0x01, 0x00, 0x00, 0x02]);
    assert_eq!(instructions.len(), 6);
  }

  #[test]
  fn failed_emit_appends_nothing(){
    let mut instructions = constants(&[1]);
    assert!(instructions.emit(Opcode::Constant, &[70000]).is_err());
    assert!(instructions.emit(Opcode::Constant, &[]).is_err());
    assert_eq!(instructions.len(), 3);
  }

  #[test]
  fn extend_concatenates(){
    let mut first = constants(&[1]);
    first.extend(&constants(&[2]));
    assert_eq!(first, constants(&[1, 2]));
  }

  #[test]
  fn hex_dump(){
    assert_eq!(constants(&[65534]).hex(), "00 FF FE");
    assert_eq!(Instructions::new().hex(), "");
  }

  #[test]
  fn iterate_stream(){
    let decoded = decode_stream(constants(&[1, 65535]).as_bytes()).unwrap();
    assert_eq!(decoded, vec![
      Decoded { offset: 0, instruction: Instruction::new(Opcode::Constant, vec![1]), width: 3 },
      Decoded { offset: 3, instruction: Instruction::new(Opcode::Constant, vec![65535]), width: 3 },
    ]);
  }

  #[test]
  fn empty_stream(){
    assert_eq!(decode_stream(&[]), Ok(vec![]));
    assert!(Instructions::new().iter().next().is_none());
  }

  #[test]
  fn undefined_opcode_skips_one_byte(){
    let bytes = [0x00, 0x00, 0x01, 0xFF, 0x00, 0x00, 0x02];
    let items: Vec<_> = InstructionIter::new(&bytes).collect();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1], Err(CodeError::UndefinedOpcode(255).at(3)));
    assert_eq!(items[2].as_ref().map(|d| d.offset), Ok(4));
  }

  #[test]
  fn truncated_tail_ends_iteration(){
    let bytes = [0x00, 0x00, 0x01, 0x00, 0x02];
    let mut iter = InstructionIter::new(&bytes);
    assert!(iter.next().unwrap().is_ok());
    assert_eq!(
      iter.next(),
      Some(Err(CodeError::TruncatedInstruction { needed: 2, available: 1 }.at(3)))
    );
    assert_eq!(iter.next(), None);
    assert_eq!(iter.offset(), bytes.len());
  }

  #[test]
  fn decode_stream_aborts_on_first_error(){
    let bytes = [0xFE, 0xFF, 0x00, 0x00, 0x01];
    assert_eq!(decode_stream(&bytes), Err(CodeError::UndefinedOpcode(0xFE).at(0)));
  }

}
