/*!
  Instruction encoding for a bytecode compiler and virtual machine: the opcode registry, the
  encoder and decoder that define the wire format both sides share, and a disassembler and
  assembler for working with instruction streams as text.

  ```
  use opcodec::bytecode::{Instructions, Opcode};

  let mut instructions = Instructions::new();
  instructions.emit(Opcode::Constant, &[1]).unwrap();
  instructions.emit(Opcode::Constant, &[2]).unwrap();
  assert_eq!(instructions.to_string(), "0000 OpConstant 1\n0003 OpConstant 2\n");
  ```
*/

#[cfg(feature = "table")]
#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod error;

pub use error::{AssemblyError, CodeError};
