/*!
  The human readable textual form of bytecode is called assembly. This module leverages the
  `strum` derives of `Opcode` to turn assembly back into instructions. The syntax is the one
  `disassemble()` prints, so a listing can be edited and reassembled:

  ```text
  # load the first two constants
  OpConstant 1
  0003 OpConstant 2   # the leading offset is optional and ignored
  ```

  Each line holds at most one instruction: an opcode name followed by its operands in
  decimal, separated by whitespace. Blank lines and `#` comments are skipped.
*/

use std::str::FromStr;

use nom::{
  IResult,
  character::complete::{
    alphanumeric1,
    char as one_char,
    digit1,
    space0,
    space1
  },
  combinator::{all_consuming, opt, rest},
  multi::many0,
  sequence::{
    delimited,
    pair,
    preceded,
    terminated
  }
};

use crate::bytecode::{Instruction, Instructions, Opcode, Operand};
use crate::error::{AssemblyError, CodeError};

// Operands stay as digit strings until the opcode, and so each operand's width, is known.
type ParsedLine<'a> = (&'a str, Vec<&'a str>);

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), rest)(input)
}

fn offset_prefix(input: &str) -> IResult<&str, &str> {
  terminated(digit1, space1)(input)
}

fn instruction(input: &str) -> IResult<&str, ParsedLine<'_>> {
  preceded(
    opt(offset_prefix),
    pair(alphanumeric1, many0(preceded(space1, digit1)))
  )(input)
}

fn line(input: &str) -> IResult<&str, Option<ParsedLine<'_>>> {
  all_consuming(
    delimited(space0, opt(instruction), pair(space0, opt(comment)))
  )(input)
}

// Instructions paired with the 1-based line they came from.
fn parse_lines(text: &str) -> Result<Vec<(usize, Instruction)>, AssemblyError> {
  let mut instructions = vec![];

  for (idx, raw_line) in text.lines().enumerate() {
    let line_number = idx + 1;

    let parsed = match line(raw_line) {
      Ok((_rest, parsed)) => parsed,
      Err(_e) => {
        return Err(AssemblyError::Syntax { line: line_number, text: raw_line.trim().to_string() });
      }
    };
    let (name, operands) = match parsed {
      Some(parsed) => parsed,
      None => continue
    };

    let opcode = match Opcode::from_str(name) {
      Ok(opcode) => opcode,
      Err(_e) => {
        return Err(AssemblyError::NotAnOperation { line: line_number, name: name.to_string() });
      }
    };
    if operands.len() != opcode.arity() {
      return Err(AssemblyError::WrongArity {
        line     : line_number,
        opcode   : opcode.name(),
        expected : opcode.arity(),
        given    : operands.len(),
      });
    }

    let overflow = |index: usize| AssemblyError::OperandOverflow {
      line    : line_number,
      opcode  : opcode.name(),
      operand : operands[index].to_string(),
      width   : opcode.operand_widths()[index],
    };

    let mut values: Vec<Operand> = Vec::with_capacity(operands.len());
    for (index, digits) in operands.iter().enumerate() {
      values.push(digits.parse::<Operand>().map_err(|_e| overflow(index))?);
    }

    let instruction = Instruction::new(opcode, values);
    match instruction.encode() {
      Ok(_bytes) => {},
      Err(CodeError::OperandOverflow { value, .. }) => {
        let index = instruction.operands.iter().position(|&v| v == value).unwrap_or(0);
        return Err(overflow(index));
      }
      Err(source) => return Err(AssemblyError::Encoding { line: line_number, source })
    }

    instructions.push((line_number, instruction));
  }

  Ok(instructions)
}

/// Parses assembly text into unencoded instructions.
pub fn parse_assembly(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  Ok(parse_lines(text)?.into_iter().map(|(_line, instruction)| instruction).collect())
}

/// Parses and encodes assembly text. Errors carry the line they appear on.
pub fn assemble(text: &str) -> Result<Instructions, AssemblyError> {
  let mut instructions = Instructions::new();
  for (line, instruction) in parse_lines(text)? {
    instructions
      .push(&instruction)
      .map_err(|source| AssemblyError::Encoding { line, source })?;
  }
  Ok(instructions)
}


#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::bytecode::disassemble;

  #[test]
  fn parse_simple(){
    let parsed = parse_assembly("OpConstant 1\nOpConstant 65534\n").unwrap();
    assert_eq!(parsed, vec![
      Instruction::new(Opcode::Constant, vec![1]),
      Instruction::new(Opcode::Constant, vec![65534]),
    ]);
  }

  #[test]
  fn skips_blank_lines_and_comments(){
    let text = "
      # This is a thing

        OpConstant   7    # trailing comment
      \t
    ";
    assert_eq!(parse_assembly(text), Ok(vec![Instruction::new(Opcode::Constant, vec![7])]));
  }

  #[test]
  fn accepts_disassembly_offsets(){
    let text = "0000 OpConstant 1\n0003 OpConstant 2\n";
    assert_eq!(assemble(text).unwrap().to_string(), text);
  }

  #[test]
  fn assemble_encodes(){
    assert_eq!(assemble("OpConstant 65534").unwrap().as_bytes(), &[0x00, 0xFF, 0xFE]);
  }

  #[test]
  fn empty_text(){
    assert_eq!(assemble("").unwrap().len(), 0);
    assert_eq!(disassemble(assemble("# nothing").unwrap().as_bytes()), "");
  }

  #[test]
  fn not_an_operation(){
    assert_eq!(
      parse_assembly("OpConstant 1\nRobert 2"),
      Err(AssemblyError::NotAnOperation { line: 2, name: "Robert".to_string() })
    );
  }

  #[test]
  fn wrong_arity(){
    assert_eq!(
      parse_assembly("OpConstant"),
      Err(AssemblyError::WrongArity { line: 1, opcode: "OpConstant", expected: 1, given: 0 })
    );
    assert_eq!(
      parse_assembly("OpConstant 1 2").unwrap_err().to_string(),
      "Error on line 1: OpConstant requires 1 arguments but was given 2."
    );
  }

  #[test]
  fn syntax_error(){
    assert_eq!(
      parse_assembly("OpConstant(1)"),
      Err(AssemblyError::Syntax { line: 1, text: "OpConstant(1)".to_string() })
    );
  }

  #[test]
  fn operand_too_wide(){
    assert_eq!(
      assemble("OpConstant 1\n\nOpConstant 65536"),
      Err(AssemblyError::OperandOverflow {
        line    : 3,
        opcode  : "OpConstant",
        operand : "65536".to_string(),
        width   : 2,
      })
    );
  }

  #[test]
  fn operand_too_wide_for_any_width(){
    let digits = "99999999999999999999999";
    let expected = AssemblyError::OperandOverflow {
      line    : 1,
      opcode  : "OpConstant",
      operand : digits.to_string(),
      width   : 2,
    };
    assert_eq!(parse_assembly(&format!("OpConstant {}", digits)), Err(expected.clone()));
    assert_eq!(
      expected.to_string(),
      "Error on line 1: operand 99999999999999999999999 of OpConstant does not fit in 2 bytes."
    );
    assert_eq!(
      parse_assembly("OpConstant 65536").unwrap_err().to_string(),
      "Error on line 1: operand 65536 of OpConstant does not fit in 2 bytes."
    );
  }

}
