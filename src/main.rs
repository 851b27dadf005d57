use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use copyjump::parse_program;
use copyjump::vm::bytecode::Program;
use copyjump::vm::input::ConsoleSource;
use copyjump::vm::machine::{Machine, MachineConfig, DEFAULT_MEMORY_SIZE};
use copyjump::vm::output::{BitSink, ConsoleSink, JsonLinesSink};

#[derive(ClapParser)]
#[command(name = "copyjump", version, about = "Run a copy/jump bit machine program")]
struct Cli {
    /// Path to the program file
    file: PathBuf,
    /// Memory cells available to the program, besides the constants 0 and 1
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,
    /// Give up on `in` after this many invalid responses (default: never)
    #[arg(long)]
    max_input_retries: Option<usize>,
    /// How to render output bits and bytes, or the program with --dump
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Print the parsed program instead of running it
    #[arg(long, conflicts_with = "check")]
    dump: bool,
    /// Report label references that cannot resolve, without running
    #[arg(long)]
    check: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match load(&cli.file) {
        Ok(program) if cli.dump => cmd_dump(&program, cli.format),
        Ok(program) if cli.check => cmd_check(&program, &cli.file),
        Ok(program) => cmd_run(program, &cli),
        Err(code) => code,
    };
    process::exit(exit_code);
}

const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

fn read_source(path: &PathBuf) -> Result<(String, String), i32> {
    let filename = path.to_string_lossy().to_string();

    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_SOURCE_SIZE => {
            eprintln!(
                "Error: file {} is too large ({} bytes, max {} bytes)",
                filename,
                meta.len(),
                MAX_SOURCE_SIZE
            );
            return Err(1);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: cannot read file {}: {}", filename, e);
            return Err(1);
        }
    }

    match std::fs::read_to_string(path) {
        Ok(source) => Ok((source, filename)),
        Err(e) => {
            eprintln!("Error: cannot read file {}: {}", filename, e);
            Err(1)
        }
    }
}

fn load(path: &PathBuf) -> Result<Program, i32> {
    let (source, filename) = read_source(path)?;
    parse_program(&source, &filename).map_err(|e| {
        eprintln!("Parse error: {}: {}", filename, e);
        1
    })
}

fn cmd_dump(program: &Program, format: Format) -> i32 {
    match format {
        Format::Text => {
            print!("{}", program.disassemble());
            println!("fingerprint: {}", program.fingerprint());
            0
        }
        Format::Json => match serde_json::to_string_pretty(program) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: cannot serialize program: {}", e);
                1
            }
        },
    }
}

fn cmd_check(program: &Program, path: &PathBuf) -> i32 {
    let filename = path.to_string_lossy();
    let missing = program.unresolved_labels();
    for (index, label) in &missing {
        let line = program.source(*index).map(|s| s.line).unwrap_or(0);
        println!("  ERROR line {}: unknown label `{}` (instruction {})", line, label, index);
    }

    if missing.is_empty() {
        println!(
            "{}: OK ({} instruction(s), {} label(s))",
            filename,
            program.len(),
            program.labels().len()
        );
        0
    } else {
        println!("{}: FAIL ({} unknown label(s))", filename, missing.len());
        1
    }
}

fn cmd_run(program: Program, cli: &Cli) -> i32 {
    let config = MachineConfig {
        memory_size: cli.memory_size,
        max_input_retries: cli.max_input_retries,
    };
    let (source, sink): (ConsoleSource, Box<dyn BitSink>) = match cli.format {
        Format::Text => (
            ConsoleSource::stdin(),
            Box::new(ConsoleSink::stdout()) as Box<dyn BitSink>,
        ),
        // keep stdout parseable
        Format::Json => (
            ConsoleSource::stdin().with_prompt(""),
            Box::new(JsonLinesSink::stdout()) as Box<dyn BitSink>,
        ),
    };

    let mut machine = Machine::with_config(program, &config, source, sink);
    match machine.run() {
        Ok(_) => {
            let pending = machine.pending_output();
            if !pending.is_empty() {
                warn!(bits = pending.len(), "program halted mid-byte; partial output discarded");
            }
            0
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            1
        }
    }
}
