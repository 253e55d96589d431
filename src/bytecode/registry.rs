/*!
  The opcode registry: a process-wide table from opcode tag to `Definition`. It is built on
  first use from the exhaustive `Opcode::definition()` match and is read-only afterwards, so
  any number of threads may call `lookup()` without synchronization.
*/

use strum::IntoEnumIterator;

use super::{Definition, Opcode};
use crate::error::CodeError;

lazy_static! {
  static ref DEFINITIONS: [Option<Definition>; 256] = {
    let mut table = [None; 256];
    for opcode in Opcode::iter() {
      table[opcode.code() as usize] = Some(opcode.definition());
    }
    table
  };
}

/// Returns the `Definition` registered for `tag`.
pub fn lookup(tag: u8) -> Result<&'static Definition, CodeError> {
  match &DEFINITIONS[tag as usize] {
    Some(definition) => Ok(definition),
    None => Err(CodeError::UndefinedOpcode(tag))
  }
}

/// Iterates over every registered definition in tag order.
pub fn definitions() -> impl Iterator<Item = &'static Definition> {
  DEFINITIONS.iter().filter_map(Option::as_ref)
}
