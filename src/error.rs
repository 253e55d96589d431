//! Errors shared by the registry, encoder, decoder, and stream walkers.

use thiserror::Error;

use crate::bytecode::Operand;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CodeError {
  #[error("opcode {0} undefined")]
  UndefinedOpcode(u8),

  #[error("{opcode} requires {expected} operands but was given {given}")]
  OperandCountMismatch {
    opcode   : &'static str,
    expected : usize,
    given    : usize,
  },

  #[error("operand {value} of {opcode} does not fit in {width} bytes")]
  OperandOverflow {
    opcode : &'static str,
    value  : Operand,
    width  : usize,
  },

  #[error("truncated instruction: needed {needed} bytes but only {available} remain")]
  TruncatedInstruction {
    needed    : usize,
    available : usize,
  },

  /// A failure while walking a stream, tagged with the offset of the instruction at fault.
  #[error("{source} at {offset:04}")]
  Malformed {
    offset : usize,
    #[source]
    source : Box<CodeError>,
  },
}

impl CodeError {
  pub fn at(self, offset: usize) -> CodeError {
    CodeError::Malformed { offset, source: Box::new(self) }
  }

  /// The offset of a stream failure, if this error came from walking a stream.
  pub fn offset(&self) -> Option<usize> {
    match self {
      CodeError::Malformed { offset, .. } => Some(*offset),
      _ => None
    }
  }
}

/// Failures turning assembly text into an instruction stream. Lines count from 1.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AssemblyError {
  #[error("Error on line {line}: cannot parse `{text}`.")]
  Syntax {
    line : usize,
    text : String,
  },

  #[error("Error on line {line}: {name} is not an operation.")]
  NotAnOperation {
    line : usize,
    name : String,
  },

  #[error("Error on line {line}: {opcode} requires {expected} arguments but was given {given}.")]
  WrongArity {
    line     : usize,
    opcode   : &'static str,
    expected : usize,
    given    : usize,
  },

  #[error("Error on line {line}: operand {operand} of {opcode} does not fit in {width} bytes.")]
  OperandOverflow {
    line    : usize,
    opcode  : &'static str,
    operand : String,
    width   : usize,
  },

  #[error("Error on line {line}: {source}.")]
  Encoding {
    line   : usize,
    #[source]
    source : CodeError,
  },
}
