//! Sample program tests — logic gates and counters built from moves and jumps

use copyjump::parse_program;
use copyjump::vm::input::ScriptedSource;
use copyjump::vm::machine::{Machine, MachineConfig, Status};
use copyjump::vm::output::RecordingSink;

const NOT_GATE: &str = include_str!("../../programs/not_gate.cj");
const OR_GATE: &str = include_str!("../../programs/or_gate.cj");
const COUNTER: &str = include_str!("../../programs/counter.cj");
const COUNT_TO_255: &str = include_str!("../../programs/count_to_255.cj");

// ── Helpers ──────────────────────────────────────────────────────

fn machine(source: &str, input: &[u8]) -> Machine<ScriptedSource, RecordingSink> {
    let program = parse_program(source, "program.cj").unwrap();
    Machine::with_config(
        program,
        &MachineConfig::default(),
        ScriptedSource::from_bits(input),
        RecordingSink::new(),
    )
}

fn gate(source: &str, input: &[u8]) -> Vec<u8> {
    let mut m = machine(source, input);
    m.run().unwrap();
    assert_eq!(m.status(), Status::Halted);
    assert_eq!(m.source().remaining(), 0, "gate left input unread");
    m.sink().bit_values()
}

/// Step until `count` bytes have come out. Panics if the program halts first.
fn first_bytes(source: &str, count: usize) -> Machine<ScriptedSource, RecordingSink> {
    let mut m = machine(source, &[]);
    while m.sink().bytes.len() < count {
        assert_eq!(m.step().unwrap(), Status::Running, "halted early");
    }
    m
}

// ── Gates ────────────────────────────────────────────────────────

#[test]
fn not_gate() {
    assert_eq!(gate(NOT_GATE, &[0]), vec![1]);
    assert_eq!(gate(NOT_GATE, &[1]), vec![0]);
}

#[test]
fn or_gate_truth_table() {
    for (a, b, expected) in [(0, 0, 0), (0, 1, 1), (1, 0, 1), (1, 1, 1)] {
        assert_eq!(gate(OR_GATE, &[a, b]), vec![expected], "{a} OR {b}");
    }
}

#[test]
fn gates_emit_no_whole_byte() {
    let mut m = machine(NOT_GATE, &[1]);
    m.run().unwrap();
    assert!(m.sink().bytes.is_empty());
    assert_eq!(m.pending_output().len(), 1);
}

// ── Counters ─────────────────────────────────────────────────────

#[test]
fn counter_emits_successive_bytes() {
    let m = first_bytes(COUNTER, 20);
    assert_eq!(m.sink().bytes, (0..20).collect::<Vec<u8>>());
}

#[test]
fn counter_bits_are_lsb_first() {
    let m = first_bytes(COUNTER, 7);
    // byte 6 = 0b0000_0110
    assert_eq!(&m.sink().bit_values()[48..56], &[0, 1, 1, 0, 0, 0, 0, 0]);
}

#[test]
fn counter_wraps_and_keeps_running() {
    let m = first_bytes(COUNTER, 300);
    let expected: Vec<u8> = (0..300).map(|n| (n % 256) as u8).collect();
    assert_eq!(m.sink().bytes, expected);
    assert_eq!(m.status(), Status::Running);
    assert_eq!(m.sink().bits.len(), 300 * 8);
}

#[test]
fn count_to_255_halts() {
    let mut m = machine(COUNT_TO_255, &[]);
    m.run().unwrap();
    assert_eq!(m.status(), Status::Halted);
    assert_eq!(m.sink().bytes, (0..=255).collect::<Vec<u8>>());
    assert!(m.pending_output().is_empty());
}

#[test]
fn counters_share_their_increment_logic() {
    let free = parse_program(COUNTER, "counter.cj").unwrap();
    let bounded = parse_program(COUNT_TO_255, "count_to_255.cj").unwrap();
    assert_eq!(bounded.len(), free.len() + 9);
    assert!(free.unresolved_labels().is_empty());
    assert!(bounded.unresolved_labels().is_empty());
}
