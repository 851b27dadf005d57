//! Parser tests — decoding, operand classification, labels, errors

use copyjump::error::Error;
use copyjump::parse_program;
use copyjump::vm::bytecode::{Program, END_LABEL};
use copyjump::vm::opcodes::{Address, Instruction, Target};

fn parse(source: &str) -> Program {
    parse_program(source, "test.cj").unwrap()
}

fn parse_err(source: &str) -> Error {
    parse_program(source, "test.cj").unwrap_err()
}

fn label(name: &str) -> Target {
    Target::Label(name.to_string())
}

// ── Instruction forms ───────────────────────────────────────

#[test]
fn move_instruction() {
    let p = parse("m 5 3");
    assert_eq!(p.instructions(), &[Instruction::Move {
        dst: Address::Numeric(5),
        src: Address::Numeric(3),
    }]);
}

#[test]
fn move_with_devices() {
    let p = parse("m out in");
    assert_eq!(p.instructions(), &[Instruction::Move {
        dst: Address::Output,
        src: Address::Input,
    }]);
}

#[test]
fn unconditional_jump() {
    let p = parse("j 0");
    assert_eq!(p.instructions(), &[Instruction::Jump {
        target: Target::Numeric(0),
    }]);
}

#[test]
fn conditional_jump() {
    let p = parse("j 2 done\nl done");
    assert_eq!(p.instructions(), &[Instruction::JumpIfSet {
        cond: Address::Numeric(2),
        target: label("done"),
    }]);
}

#[test]
fn two_way_jump() {
    let p = parse("j in zero one");
    assert_eq!(p.instructions(), &[Instruction::JumpEither {
        cond: Address::Input,
        if_zero: label("zero"),
        if_one: label("one"),
    }]);
}

#[test]
fn next_is_fall_through() {
    let p = parse("j 2 loop next");
    assert_eq!(p.instructions(), &[Instruction::JumpEither {
        cond: Address::Numeric(2),
        if_zero: label("loop"),
        if_one: Target::Next,
    }]);
}

#[test]
fn device_names_are_labels_as_targets() {
    let p = parse("j out");
    assert_eq!(p.instructions(), &[Instruction::Jump { target: label("out") }]);
}

#[test]
fn signed_number_is_a_label_target() {
    let p = parse("j -1");
    assert_eq!(p.instructions(), &[Instruction::Jump { target: label("-1") }]);
}

// ── Labels ──────────────────────────────────────────────────

#[test]
fn label_binds_to_following_instruction() {
    let p = parse("m out 1\nl here\nm out 0\nj here");
    assert_eq!(p.len(), 3);
    assert_eq!(p.labels().get("here"), Some(1));
}

#[test]
fn label_at_start_and_end() {
    let p = parse("l top\nm out 1\nl bottom");
    assert_eq!(p.labels().get("top"), Some(0));
    assert_eq!(p.labels().get("bottom"), Some(1));
}

#[test]
fn end_label_is_instruction_count() {
    let p = parse("m out 1\nm out 0\nl x\nm out 1");
    assert_eq!(p.labels().get(END_LABEL), Some(3));
}

#[test]
fn end_label_of_empty_program() {
    let p = parse("# nothing\n");
    assert!(p.is_empty());
    assert_eq!(p.labels().get(END_LABEL), Some(0));
}

#[test]
fn declared_end_is_overridden() {
    let p = parse("l end\nm out 1\nm out 1");
    assert_eq!(p.labels().get(END_LABEL), Some(2));
}

#[test]
fn redefined_label_takes_last_position() {
    let p = parse("l a\nm out 1\nl a\nm out 0");
    assert_eq!(p.labels().get("a"), Some(1));
}

#[test]
fn forward_references_parse() {
    let p = parse("j later\nm out 1\nl later");
    assert!(p.unresolved_labels().is_empty());
}

#[test]
fn unresolved_labels_are_listed() {
    let p = parse("j nowhere\nj 2 a b\nl a\nj nowhere");
    assert_eq!(p.unresolved_labels(), vec![
        (0, "nowhere".to_string()),
        (1, "b".to_string()),
    ]);
}

#[test]
fn source_map_points_at_lines() {
    let p = parse("# header\nm out 1\n\nl x\nj x   # back");
    assert_eq!(p.source(0).unwrap().line, 2);
    assert_eq!(p.source(1).unwrap().line, 5);
    assert_eq!(p.source(1).unwrap().text, "j x");
}

// ── Determinism ─────────────────────────────────────────────

#[test]
fn parsing_is_deterministic() {
    let src = include_str!("../../programs/count_to_255.cj");
    let a = parse(src);
    let b = parse(src);
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_ignores_comments_and_spacing() {
    let a = parse("l top\nm out 1\nj top");
    let b = parse("#begin:\nprose\n#end:\nl   top\n  m out 1   # one\nj top");
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_changes_with_code() {
    assert_ne!(parse("m out 1").fingerprint(), parse("m out 0").fingerprint());
}

#[test]
fn program_serializes_to_json() {
    let p = parse("l top\nm out in\nj top");
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["labels"]["top"], 0);
    assert_eq!(json["labels"]["end"], 2);
    assert_eq!(json["instructions"][0]["Move"]["dst"], "Output");
}

// ── Decode errors ───────────────────────────────────────────

#[test]
fn unknown_opcode() {
    let err = parse_err("m out 1\nx 1 2");
    match err {
        Error::InstructionDecode { index, line, text, .. } => {
            assert_eq!(index, 1);
            assert_eq!(line, 2);
            assert_eq!(text, "x 1 2");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn move_arity() {
    assert!(matches!(parse_err("m 2"), Error::InstructionDecode { .. }));
    assert!(matches!(parse_err("m 2 3 4"), Error::InstructionDecode { .. }));
}

#[test]
fn jump_arity() {
    assert!(matches!(parse_err("j"), Error::InstructionDecode { .. }));
    assert!(matches!(parse_err("j 1 a b c"), Error::InstructionDecode { .. }));
}

#[test]
fn label_arity() {
    assert!(matches!(parse_err("l"), Error::InstructionDecode { .. }));
    assert!(matches!(parse_err("l a b"), Error::InstructionDecode { .. }));
}

#[test]
fn number_too_large() {
    let err = parse_err("m 2 99999999999999999999999999");
    assert!(matches!(err, Error::InstructionDecode { .. }));
}

#[test]
fn decode_error_message_names_line() {
    let msg = parse_err("\n\nq 1").to_string();
    assert!(msg.contains("line 3"), "{msg}");
    assert!(msg.contains("unknown opcode `q`"), "{msg}");
}

// ── Address errors ──────────────────────────────────────────

#[test]
fn label_as_move_operand() {
    let err = parse_err("m foo 1");
    assert!(matches!(err.root(), Error::InvalidAddress { address, .. } if address == "foo"));
    assert_eq!(err.instruction_index(), Some(0));
}

#[test]
fn write_to_input() {
    assert!(matches!(parse_err("m in 1").root(), Error::InvalidAddress { .. }));
}

#[test]
fn read_from_output() {
    assert!(matches!(parse_err("m 2 out").root(), Error::InvalidAddress { .. }));
    assert!(matches!(parse_err("j out end").root(), Error::InvalidAddress { .. }));
}
