//! Errors raised while parsing or executing a program

use std::io;

/// Every failure the toolchain can report.
///
/// Faults raised deep inside the machine (memory, input, label lookup) carry
/// no location of their own; the parser and the machine wrap them in
/// [`Error::At`] with the offending instruction before handing them back.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot decode instruction {index} (line {line}: `{text}`): {reason}")]
    InstructionDecode {
        index: usize,
        line: usize,
        text: String,
        reason: String,
    },

    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    #[error("invalid address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: &'static str },

    #[error("address {address} is outside memory of {size} cells")]
    MemoryBounds { address: usize, size: usize },

    #[error("jump target {target} is past the end of the program ({len} instructions)")]
    JumpOutOfRange { target: usize, len: usize },

    #[error("input closed while waiting for a bit")]
    InputClosed,

    #[error("gave up reading input after {0} invalid responses")]
    InputRetriesExceeded(usize),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("line {line} (instruction {index}: `{text}`): {source}")]
    At {
        index: usize,
        line: usize,
        text: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the location of the instruction that raised this error.
    pub fn at(self, index: usize, line: usize, text: &str) -> Self {
        match self {
            // decode errors already name their line
            Error::InstructionDecode { .. } | Error::At { .. } => self,
            other => Error::At {
                index,
                line,
                text: text.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any location context removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::At { source, .. } => source.root(),
            other => other,
        }
    }

    /// Instruction index the error was raised at, when known.
    pub fn instruction_index(&self) -> Option<usize> {
        match self {
            Error::At { index, .. } | Error::InstructionDecode { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
