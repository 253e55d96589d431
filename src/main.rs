use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};

use opcodec::bytecode::{assemble, Instructions};

/// Assembles or loads an instruction stream and prints its disassembly.
#[derive(Parser, Debug)]
#[command(name = "opcodec", version, about)]
struct Args {
  /// Input file. Reads standard input when absent.
  input: Option<PathBuf>,

  /// Treat the input as raw bytecode instead of assembly text.
  #[arg(short, long)]
  binary: bool,

  /// Print the encoded bytes as hex before the listing.
  #[arg(long)]
  hex: bool,

  /// Print the listing as a table.
  #[arg(short, long)]
  table: bool,

  /// Raise the log level; repeat for more detail. `RUST_LOG` takes precedence.
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .init();
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
  match path {
    Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
    None => {
      let mut buffer = vec![];
      io::stdin().read_to_end(&mut buffer).context("reading standard input")?;
      Ok(buffer)
    }
  }
}

/// Builds the stream described by `args` from `input` and writes the requested listing.
fn run(args: &Args, input: Vec<u8>, out: &mut impl Write) -> Result<()> {
  let instructions = match args.binary {
    true  => Instructions::from_bytes(input),
    false => {
      let text = String::from_utf8(input).context("assembly input is not UTF-8")?;
      assemble(&text)?
    }
  };
  debug!("{} bytes of bytecode", instructions.len());

  if args.hex {
    writeln!(out, "{}", instructions.hex())?;
  }

  if args.table {
    #[cfg(feature = "table")]
    {
      write!(out, "{}", opcodec::bytecode::disassembly_table(instructions.as_bytes()))?;
      return Ok(());
    }
    #[cfg(not(feature = "table"))]
    log::warn!("built without the `table` feature; printing plain text");
  }

  write!(out, "{}", instructions)?;
  Ok(())
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_logging(args.verbose);

  let input = read_input(&args.input)?;
  let stdout = io::stdout();
  let mut out = stdout.lock();
  run(&args, input, &mut out)
}


#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use opcodec::AssemblyError;

  use super::*;

  fn run_with(flags: &[&str], input: &[u8]) -> Result<String> {
    let args = Args::try_parse_from(std::iter::once("opcodec").chain(flags.iter().copied()))?;
    let mut out = vec![];
    run(&args, input.to_vec(), &mut out)?;
    Ok(String::from_utf8(out)?)
  }

  #[test]
  fn assembly_input(){
    let listing = run_with(&[], b"OpConstant 1\nOpConstant 2\n").unwrap();
    assert_eq!(listing, "0000 OpConstant 1\n0003 OpConstant 2\n");
  }

  #[test]
  fn binary_input(){
    let listing = run_with(&["--binary"], &[0x00, 0xFF, 0xFE, 0xFF]).unwrap();
    assert_eq!(listing, "0000 OpConstant 65534\nERROR: opcode 255 undefined at 0003\n");
  }

  #[test]
  fn hex_printed_before_listing(){
    let listing = run_with(&["--hex"], b"OpConstant 1\nOpConstant 2").unwrap();
    assert_eq!(listing, "00 00 01 00 00 02\n0000 OpConstant 1\n0003 OpConstant 2\n");
  }

  #[cfg(feature = "table")]
  #[test]
  fn table_replaces_plain_listing(){
    let listing = run_with(&["--table"], b"OpConstant 65534").unwrap();
    assert!(listing.contains("Offset"));
    assert!(listing.contains("OpConstant"));
    assert!(listing.contains("00 FF FE"));
    assert!(!listing.contains("0000 OpConstant 65534"));
  }

  #[test]
  fn assembly_error_fails(){
    let error = run_with(&[], b"OpConstant 1\nOpBogus 2").unwrap_err();
    assert_eq!(
      error.downcast_ref::<AssemblyError>(),
      Some(&AssemblyError::NotAnOperation { line: 2, name: "OpBogus".to_string() })
    );
  }

  #[test]
  fn non_utf8_assembly_fails(){
    assert!(run_with(&[], &[0xFF, 0xFE]).is_err());
  }

}
