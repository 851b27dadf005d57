//! Copy/jump virtual machine
//!
//! Instruction set, parsed program format, bit memory, the input and output
//! devices and the engine that runs programs against them.

pub mod opcodes;
pub mod bytecode;
pub mod memory;
pub mod input;
pub mod output;
pub mod machine;
