use std::fmt;

/// Marker line that opens a suppressed block of source.
pub const BLOCK_BEGIN: &str = "#begin:";
/// Marker line that closes a suppressed block of source.
pub const BLOCK_END: &str = "#end:";
/// Start of an inline comment.
pub const COMMENT: char = '#';

/// Opcode token that declares a label.
pub const LABEL: &str = "l";
/// Opcode token for a bit copy.
pub const MOVE: &str = "m";
/// Opcode token for every jump form.
pub const JUMP: &str = "j";

/// Jump target meaning "fall through".
pub const NEXT: &str = "next";

/// Symbolic address of the input device.
pub const INPUT: &str = "in";
/// Symbolic address of the output device.
pub const OUTPUT: &str = "out";

/// A significant source line: comments removed, split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original text
    pub number: usize,
    /// The line with comments stripped and whitespace trimmed
    pub text: String,
    pub tokens: Vec<String>,
}

impl SourceLine {
    pub fn opcode(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_label(&self) -> bool {
        self.opcode() == LABEL
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}: {}", self.number, self.text)
    }
}
