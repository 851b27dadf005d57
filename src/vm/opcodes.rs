//! Copy/jump instruction set

use std::fmt;

use serde::Serialize;

/// The content of a single memory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Bit {
    #[default]
    Zero,
    One,
}

impl Bit {
    pub fn is_set(self) -> bool {
        self == Bit::One
    }
}

impl From<bool> for Bit {
    fn from(set: bool) -> Self {
        if set {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }
}

impl TryFrom<i64> for Bit {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(other),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Operand of a move or a jump condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Address {
    /// A memory cell; 0 and 1 are the constant cells
    Numeric(usize),
    /// Reads block until the input device supplies a bit
    Input,
    /// Writes go to the output device
    Output,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Numeric(n) => write!(f, "{}", n),
            Address::Input => write!(f, "in"),
            Address::Output => write!(f, "out"),
        }
    }
}

/// Destination of a jump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    /// Absolute instruction index
    Numeric(usize),
    /// Resolved through the label table when the jump is taken
    Label(String),
    /// `next`: the instruction after the jump
    Next,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Numeric(n) => write!(f, "{}", n),
            Target::Label(name) => write!(f, "{}", name),
            Target::Next => write!(f, "next"),
        }
    }
}

/// A decoded instruction. Programs are decoded once; the machine never looks
/// at source tokens again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    /// `m dst src`: copy the bit at `src` into `dst`
    Move { dst: Address, src: Address },
    /// `j target`
    Jump { target: Target },
    /// `j cond target`: jump when `cond` is 1, otherwise fall through
    JumpIfSet { cond: Address, target: Target },
    /// `j cond if_zero if_one`
    JumpEither {
        cond: Address,
        if_zero: Target,
        if_one: Target,
    },
}

impl Instruction {
    /// Label names this instruction may jump to.
    pub fn label_refs(&self) -> impl Iterator<Item = &str> {
        let targets: [Option<&Target>; 2] = match self {
            Instruction::Move { .. } => [None, None],
            Instruction::Jump { target } | Instruction::JumpIfSet { target, .. } => {
                [Some(target), None]
            }
            Instruction::JumpEither { if_zero, if_one, .. } => [Some(if_zero), Some(if_one)],
        };
        targets.into_iter().flatten().filter_map(|t| match t {
            Target::Label(name) => Some(name.as_str()),
            Target::Numeric(_) | Target::Next => None,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Move { dst, src } => write!(f, "m {} {}", dst, src),
            Instruction::Jump { target } => write!(f, "j {}", target),
            Instruction::JumpIfSet { cond, target } => write!(f, "j {} {}", cond, target),
            Instruction::JumpEither {
                cond,
                if_zero,
                if_one,
            } => write!(f, "j {} {} {}", cond, if_zero, if_one),
        }
    }
}
