use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::binary::make;
use crate::error::CodeError;

/// The integer type every operand decodes to, whatever its encoded width.
pub type Operand = u64;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its tag on the wire, so variants must never be
  reordered or renumbered once bytecode has been emitted. New opcodes are appended with
  an explicit discriminant and an arm in `Opcode::operand_widths()`.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  /// Pushes the constant-pool entry at the operand's index.
  #[strum(serialize = "OpConstant")]
  Constant = 0,  // OpConstant( index:16 )
}

/// Encoding metadata for one opcode: its display name and the byte width of each operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Definition {
  pub opcode         : Opcode,
  pub name           : &'static str,
  pub operand_widths : &'static [usize],
}

impl Definition {
  pub fn operand_count(&self) -> usize {
    self.operand_widths.len()
  }

  /// Total size in bytes of the operand region.
  pub fn operands_width(&self) -> usize {
    self.operand_widths.iter().sum()
  }

  /// Total size in bytes of an encoded instruction, opcode included.
  pub fn width(&self) -> usize {
    1 + self.operands_width()
  }
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn name(&self) -> &'static str {
    (*self).into()
  }

  pub fn operand_widths(&self) -> &'static [usize] {
    match self {
      Opcode::Constant => &[2],
    }
  }

  pub fn arity(&self) -> usize {
    self.operand_widths().len()
  }

  pub fn definition(&self) -> Definition {
    Definition {
      opcode         : *self,
      name           : self.name(),
      operand_widths : self.operand_widths(),
    }
  }
}

/// Holds the unencoded components of an instruction. Decoded instructions own their
/// operands and keep no reference to the stream they came from.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub opcode   : Opcode,
  pub operands : Vec<Operand>,
}

impl Instruction {
  pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Instruction {
    Instruction { opcode, operands }
  }

  pub fn encode(&self) -> Result<Vec<u8>, CodeError> {
    make(self.opcode, &self.operands)
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.opcode)?;
    for operand in &self.operands {
      write!(f, " {}", operand)?;
    }
    Ok(())
  }
}
