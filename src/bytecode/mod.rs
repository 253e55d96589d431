/*!

  Instructions are a single opcode byte followed by zero or more operands. Each opcode has a
  `Definition` giving its display name and the width in bytes of each of its operands, and
  operands are encoded big-endian at exactly that width. For example, `OpConstant` (tag 0)
  takes one 16 bit operand, so `OpConstant 65534` encodes as

  ```text
    00 FF FE
    ^  ^^^^^
    |  operand
    opcode
  ```

  Instructions are concatenated with no separators or length prefixes. The only way to find
  where one instruction ends is to look up its opcode's definition, which is why the
  registry is consulted on every step of a stream walk.

  The opcode itself is a closed enum rather than an open table, so adding an opcode is one
  variant and one arm in `Opcode::operand_widths()`, and the compiler flags anything that
  matches on opcodes and has not been updated. The registry is derived from the enum once
  and is read-only afterwards.

  Every stage reports failures the same way, with `CodeError`. The encoder refuses operands
  that do not match the definition, the decoder refuses operand regions that are too short,
  and stream walks wrap either failure with the offset it occurred at.

*/

mod binary;
mod instruction;
mod registry;
mod stream;
mod disassembly;
mod assembly;

pub use binary::{make, make_raw, encode_with, read_operands, read_u16, MAX_OPERAND_WIDTH};
pub use instruction::{Definition, Instruction, Opcode, Operand};
pub use registry::{lookup, definitions};
pub use stream::{decode_stream, Decoded, InstructionIter, Instructions};
pub use disassembly::{disassemble, fmt_instruction};
#[cfg(feature = "table")]
pub use disassembly::disassembly_table;
pub use assembly::{assemble, parse_assembly};
