//! Execution engine
//!
//! The machine owns everything a running program can touch: its memory, the
//! input and output devices and the partial output byte. One `step` runs one
//! instruction; `run` steps until the instruction pointer reaches the end of
//! the program. There is no step budget, so programs that loop forever (a
//! free-running counter, say) make `run` loop forever too. Drive `step`
//! directly to stay in control.

use tracing::{info, trace};

use crate::error::{Error, Result};

use super::bytecode::Program;
use super::input::{read_input_bit, BitSource};
use super::memory::Memory;
use super::opcodes::{Address, Bit, Instruction, Target};
use super::output::{BitSink, ByteAccumulator};

/// Caller cells allocated when nothing else is asked for.
pub const DEFAULT_MEMORY_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Caller cells, not counting the two constants
    pub memory_size: usize,
    /// Invalid input responses tolerated per read; `None` retries forever
    pub max_input_retries: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_input_retries: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
}

/// Memory plus the two devices. Kept apart from the program so an
/// instruction can be borrowed while its operands are read and written.
struct Bus<S, K> {
    memory: Memory,
    source: S,
    sink: K,
    output: ByteAccumulator,
    max_input_retries: Option<usize>,
}

impl<S: BitSource, K: BitSink> Bus<S, K> {
    fn read(&mut self, address: Address) -> Result<Bit> {
        match address {
            Address::Numeric(i) => self.memory.load(i),
            Address::Input => read_input_bit(&mut self.source, self.max_input_retries),
            Address::Output => Err(Error::InvalidAddress {
                address: address.to_string(),
                reason: "the output device cannot be read",
            }),
        }
    }

    fn write(&mut self, address: Address, bit: Bit) -> Result<()> {
        match address {
            Address::Numeric(i) => self.memory.store(i, bit),
            Address::Output => {
                self.sink.on_bit(bit)?;
                if let Some(byte) = self.output.push(bit) {
                    self.sink.on_byte(byte)?;
                }
                Ok(())
            }
            Address::Input => Err(Error::InvalidAddress {
                address: address.to_string(),
                reason: "the input device cannot be written",
            }),
        }
    }
}

pub struct Machine<S, K> {
    program: Program,
    bus: Bus<S, K>,
    ip: usize,
    steps: u64,
}

impl<S: BitSource, K: BitSink> Machine<S, K> {
    pub fn new(program: Program, memory: Memory, source: S, sink: K) -> Self {
        Self {
            program,
            bus: Bus {
                memory,
                source,
                sink,
                output: ByteAccumulator::new(),
                max_input_retries: None,
            },
            ip: 0,
            steps: 0,
        }
    }

    /// A machine with zeroed memory sized and limited per `config`.
    pub fn with_config(program: Program, config: &MachineConfig, source: S, sink: K) -> Self {
        Self::new(program, Memory::new(config.memory_size), source, sink)
            .max_input_retries(config.max_input_retries)
    }

    pub fn max_input_retries(mut self, limit: Option<usize>) -> Self {
        self.bus.max_input_retries = limit;
        self
    }

    pub fn status(&self) -> Status {
        if self.ip < self.program.len() {
            Status::Running
        } else {
            Status::Halted
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn memory(&self) -> &Memory {
        &self.bus.memory
    }

    pub fn source(&self) -> &S {
        &self.bus.source
    }

    pub fn sink(&self) -> &K {
        &self.bus.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.bus.sink
    }

    /// Output bits that have not yet made up a whole byte. Whatever is left
    /// here when the program halts is dropped.
    pub fn pending_output(&self) -> &[Bit] {
        self.bus.output.pending()
    }

    pub fn into_parts(self) -> (Memory, S, K) {
        (self.bus.memory, self.bus.source, self.bus.sink)
    }

    /// Execute one instruction. A halted machine stays halted.
    pub fn step(&mut self) -> Result<Status> {
        let ip = self.ip;
        let Some(inst) = self.program.get(ip) else {
            return Ok(Status::Halted);
        };

        let next = Self::execute(&self.program, &mut self.bus, ip, inst).map_err(|e| {
            match self.program.source(ip) {
                Some(src) => e.at(ip, src.line, &src.text),
                None => e,
            }
        })?;
        trace!(ip, next, "{}", inst);

        self.ip = next;
        self.steps += 1;

        let status = self.status();
        if status == Status::Halted {
            info!(steps = self.steps, "program halted");
        }
        Ok(status)
    }

    /// Step until halted; returns the number of instructions executed by
    /// this call.
    pub fn run(&mut self) -> Result<u64> {
        let start = self.steps;
        while self.step()? == Status::Running {}
        Ok(self.steps - start)
    }

    fn execute(program: &Program, bus: &mut Bus<S, K>, ip: usize, inst: &Instruction) -> Result<usize> {
        match inst {
            Instruction::Move { dst, src } => {
                let bit = bus.read(*src)?;
                bus.write(*dst, bit)?;
                Ok(ip + 1)
            }
            Instruction::Jump { target } => resolve(program, ip, target),
            Instruction::JumpIfSet { cond, target } => {
                if bus.read(*cond)?.is_set() {
                    resolve(program, ip, target)
                } else {
                    Ok(ip + 1)
                }
            }
            Instruction::JumpEither {
                cond,
                if_zero,
                if_one,
            } => {
                let target = if bus.read(*cond)?.is_set() { if_one } else { if_zero };
                resolve(program, ip, target)
            }
        }
    }
}

/// Instruction index a jump at `ip` to `target` lands on. Numeric targets
/// are absolute.
pub fn resolve(program: &Program, ip: usize, target: &Target) -> Result<usize> {
    match target {
        Target::Next => Ok(ip + 1),
        Target::Numeric(i) if *i > program.len() => Err(Error::JumpOutOfRange {
            target: *i,
            len: program.len(),
        }),
        Target::Numeric(i) => Ok(*i),
        Target::Label(name) => program
            .labels()
            .get(name)
            .ok_or_else(|| Error::UnknownLabel(name.clone())),
    }
}
