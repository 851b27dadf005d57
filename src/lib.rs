//! A bit-level interpreter whose whole instruction set is a bit copy (`m`)
//! and a jump (`j`).

pub mod error;
pub mod lexer;
pub mod parser;
pub mod vm;

use error::Result;
use lexer::Lexer;
use parser::Parser;
use vm::bytecode::Program;

/// Scan and parse program text in one go.
pub fn parse_program(source: &str, filename: &str) -> Result<Program> {
    let lines = Lexer::new(source, filename).tokenize();
    Parser::new(lines, filename).parse()
}
