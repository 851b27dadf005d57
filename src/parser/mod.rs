use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lexer::tokens::{SourceLine, INPUT, JUMP, MOVE, NEXT, OUTPUT};
use crate::vm::bytecode::{LabelTable, Program, SourceInfo, END_LABEL};
use crate::vm::opcodes::{Address, Instruction, Target};

fn numeric_token() -> &'static Regex {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC.get_or_init(|| Regex::new(r"^[0-9]+$").expect("numeric token pattern"))
}

/// What an address operand is used for; decides which devices it may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

pub struct Parser {
    lines: Vec<SourceLine>,
    filename: String,
}

impl Parser {
    pub fn new(lines: Vec<SourceLine>, filename: &str) -> Self {
        Self {
            lines,
            filename: filename.to_string(),
        }
    }

    // ── Public API ──────────────────────────────────────────────────────

    /// Decode every line, binding labels as they appear. The first bad line
    /// aborts parsing.
    pub fn parse(self) -> Result<Program> {
        let mut instructions = Vec::with_capacity(self.lines.len());
        let mut source_map = Vec::with_capacity(self.lines.len());
        let mut labels = LabelTable::new();

        for line in &self.lines {
            let index = instructions.len();
            if line.is_label() {
                self.bind_label(&mut labels, line, index)?;
                continue;
            }
            instructions.push(decode(line, index)?);
            source_map.push(SourceInfo {
                line: line.number,
                text: line.text.clone(),
            });
        }

        debug!(
            file = %self.filename,
            instructions = instructions.len(),
            labels = labels.len(),
            "parsed program"
        );
        Ok(Program::new(instructions, source_map, labels))
    }

    fn bind_label(&self, labels: &mut LabelTable, line: &SourceLine, index: usize) -> Result<()> {
        let [_, name] = line.tokens.as_slice() else {
            return Err(decode_error(
                line,
                index,
                format!("label declaration takes one name, got {}", line.tokens.len() - 1),
            ));
        };

        if name == END_LABEL || name == NEXT {
            warn!(
                file = %self.filename,
                line = line.number,
                label = %name,
                "reserved label cannot be declared; declaration ignored"
            );
            return Ok(());
        }
        if let Some(previous) = labels.bind(name, index) {
            warn!(
                file = %self.filename,
                line = line.number,
                label = %name,
                previous,
                index,
                "label redefined"
            );
        }
        Ok(())
    }
}

/// Turn one instruction line into an [`Instruction`].
pub fn decode(line: &SourceLine, index: usize) -> Result<Instruction> {
    let tokens: Vec<&str> = line.tokens.iter().map(String::as_str).collect();
    let inst = match tokens.as_slice() {
        [MOVE, dst, src] => Instruction::Move {
            dst: address(dst, Access::Write, line, index)?,
            src: address(src, Access::Read, line, index)?,
        },
        [MOVE, rest @ ..] => {
            return Err(decode_error(
                line,
                index,
                format!("`m` takes 2 operands, got {}", rest.len()),
            ))
        }
        [JUMP, target] => Instruction::Jump {
            target: target_of(target, line, index)?,
        },
        [JUMP, cond, target] => Instruction::JumpIfSet {
            cond: address(cond, Access::Read, line, index)?,
            target: target_of(target, line, index)?,
        },
        [JUMP, cond, if_zero, if_one] => Instruction::JumpEither {
            cond: address(cond, Access::Read, line, index)?,
            if_zero: target_of(if_zero, line, index)?,
            if_one: target_of(if_one, line, index)?,
        },
        [JUMP, rest @ ..] => {
            return Err(decode_error(
                line,
                index,
                format!("`j` takes 1 to 3 operands, got {}", rest.len()),
            ))
        }
        [op, ..] => {
            return Err(decode_error(line, index, format!("unknown opcode `{}`", op)));
        }
        [] => return Err(decode_error(line, index, "empty instruction".to_string())),
    };
    Ok(inst)
}

fn decode_error(line: &SourceLine, index: usize, reason: String) -> Error {
    Error::InstructionDecode {
        index,
        line: line.number,
        text: line.text.clone(),
        reason,
    }
}

/// `Some(n)` for an all-digit token, `None` for anything else.
fn numeric(token: &str, line: &SourceLine, index: usize) -> Result<Option<usize>> {
    if !numeric_token().is_match(token) {
        return Ok(None);
    }
    token
        .parse::<usize>()
        .map(Some)
        .map_err(|_| decode_error(line, index, format!("number `{}` is too large", token)))
}

fn address(token: &str, access: Access, line: &SourceLine, index: usize) -> Result<Address> {
    let invalid = |reason: &'static str| {
        Error::InvalidAddress {
            address: token.to_string(),
            reason,
        }
        .at(index, line.number, &line.text)
    };

    if let Some(n) = numeric(token, line, index)? {
        return Ok(Address::Numeric(n));
    }
    match (token, access) {
        (INPUT, Access::Read) => Ok(Address::Input),
        (OUTPUT, Access::Write) => Ok(Address::Output),
        (INPUT, Access::Write) => Err(invalid("the input device cannot be written")),
        (OUTPUT, Access::Read) => Err(invalid("the output device cannot be read")),
        _ => Err(invalid("expected a cell number, `in` or `out`")),
    }
}

fn target_of(token: &str, line: &SourceLine, index: usize) -> Result<Target> {
    Ok(match numeric(token, line, index)? {
        Some(n) => Target::Numeric(n),
        None if token == NEXT => Target::Next,
        None => Target::Label(token.to_string()),
    })
}
