//! Trace text format.
//!
//! One access per line, `<op> <address>`:
//! - `op` is `L`/`Load` or `S`/`Store`, case does not matter
//! - `address` is decimal or `0x` hex
//!
//! Blank lines and `#` comments are skipped, a line holding `exit` ends the trace.

use std::{fmt, fs, io::BufRead, str::FromStr};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::error::MalformedInstructionError;

const END_OF_TRACE: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Load,
    Store,
}

impl FromStr for Operation {
    type Err = MalformedInstructionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "load" => Ok(Operation::Load),
            "s" | "store" => Ok(Operation::Store),
            _ => Err(MalformedInstructionError::UnknownOperation(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Operation,
    pub addr: u64,
}

impl Instruction {
    pub fn load(addr: u64) -> Self {
        Instruction {
            op: Operation::Load,
            addr,
        }
    }
    pub fn store(addr: u64) -> Self {
        Instruction {
            op: Operation::Store,
            addr,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Operation::Load => 'L',
            Operation::Store => 'S',
        };
        write!(f, "{op} {}", self.addr)
    }
}

fn parse_addr(s: &str) -> Result<u64, MalformedInstructionError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| MalformedInstructionError::InvalidAddress(s.to_string()))
}

impl FromStr for Instruction {
    type Err = MalformedInstructionError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let op = tokens
            .next()
            .ok_or(MalformedInstructionError::MissingOperation)?
            .parse::<Operation>()?;
        let addr = parse_addr(tokens.next().ok_or(MalformedInstructionError::MissingAddress)?)?;
        let rest: Vec<&str> = tokens.collect();
        if !rest.is_empty() {
            return Err(MalformedInstructionError::TrailingTokens(rest.join(" ")));
        }
        Ok(Instruction { op, addr })
    }
}

/// parse a whole trace, stop at the `exit` line if there is one
pub fn parse_trace<B: BufRead>(reader: B) -> Result<Vec<Instruction>> {
    let mut trace = vec![];
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.wrap_err("cannot read trace line")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.eq_ignore_ascii_case(END_OF_TRACE) {
            break;
        }
        let instruction = line
            .parse::<Instruction>()
            .wrap_err_with(|| format!("malformed instruction at line {}: `{line}`", line_no + 1))?;
        trace.push(instruction);
    }
    tracing::debug!(len = trace.len(), "trace parsed");
    Ok(trace)
}

pub fn trace_from_file(path: &str) -> Result<Vec<Instruction>> {
    let content = fs::read_to_string(path).wrap_err_with(|| format!("cannot read trace file {path}"))?;
    parse_trace(content.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn test_parse_instruction() {
        assert_eq!("L 100".parse::<Instruction>(), Ok(Instruction::load(100)));
        assert_eq!("store 0x20".parse::<Instruction>(), Ok(Instruction::store(32)));
        assert_eq!("  s   7  ".parse::<Instruction>(), Ok(Instruction::store(7)));
        assert_eq!(
            "X 1".parse::<Instruction>(),
            Err(MalformedInstructionError::UnknownOperation("X".to_string()))
        );
        assert_eq!(
            "L -4".parse::<Instruction>(),
            Err(MalformedInstructionError::InvalidAddress("-4".to_string()))
        );
        assert_eq!(
            "L".parse::<Instruction>(),
            Err(MalformedInstructionError::MissingAddress)
        );
        assert_eq!(
            "".parse::<Instruction>(),
            Err(MalformedInstructionError::MissingOperation)
        );
        assert_eq!(
            "   ".parse::<Instruction>(),
            Err(MalformedInstructionError::MissingOperation)
        );
        assert_eq!(
            "L 1 2".parse::<Instruction>(),
            Err(MalformedInstructionError::TrailingTokens("2".to_string()))
        );
    }

    #[test]
    fn test_parse_trace_stops_at_exit() {
        let text = "# warm up\nL 0\n\nS 32\nEXIT\nL 64\n";
        let trace = parse_trace(text.as_bytes()).unwrap();
        assert_eq!(trace, vec![Instruction::load(0), Instruction::store(32)]);
    }

    #[test]
    fn test_parse_trace_reports_line() {
        let text = "L 0\nL zero\n";
        let err = parse_trace(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert_eq!(
            err.downcast_ref::<MalformedInstructionError>(),
            Some(&MalformedInstructionError::InvalidAddress("zero".to_string()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::store(200).to_string(), "S 200");
    }
}
