//! Parsed program format: instruction list, source map and label table

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::opcodes::Instruction;

/// Name of the label that always points one past the last instruction.
pub const END_LABEL: &str = "end";

/// Label name to instruction index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelTable {
    labels: BTreeMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `index`, returning the previous binding if any.
    pub fn bind(&mut self, name: &str, index: usize) -> Option<usize> {
        self.labels.insert(name.to_string(), index)
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Where an instruction came from in the program text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub line: usize,
    pub text: String,
}

/// A parsed program. Immutable once the parser hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    instructions: Vec<Instruction>,
    source_map: Vec<SourceInfo>,
    labels: LabelTable,
}

impl Program {
    /// Assemble a program. The `end` label is (re)bound to the instruction
    /// count here so it can never disagree with the program length.
    pub fn new(
        instructions: Vec<Instruction>,
        source_map: Vec<SourceInfo>,
        mut labels: LabelTable,
    ) -> Self {
        debug_assert_eq!(instructions.len(), source_map.len());
        labels.bind(END_LABEL, instructions.len());
        Self {
            instructions,
            source_map,
            labels,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn source(&self, index: usize) -> Option<&SourceInfo> {
        self.source_map.get(index)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Label references that no `l` line binds, with the index of the first
    /// instruction using each. These only fail if the jump is actually taken.
    pub fn unresolved_labels(&self) -> Vec<(usize, String)> {
        let mut seen = BTreeMap::new();
        for (idx, inst) in self.instructions.iter().enumerate() {
            for name in inst.label_refs() {
                if !self.labels.contains(name) {
                    seen.entry(name.to_string()).or_insert(idx);
                }
            }
        }
        let mut missing: Vec<(usize, String)> =
            seen.into_iter().map(|(name, idx)| (idx, name)).collect();
        missing.sort();
        missing
    }

    /// Canonical listing: one instruction per line prefixed by its index, with
    /// label declarations interleaved where they bind.
    pub fn disassemble(&self) -> String {
        let mut by_index: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (name, idx) in self.labels.iter() {
            by_index.entry(idx).or_default().push(name);
        }

        let mut out = String::new();
        for idx in 0..=self.instructions.len() {
            if let Some(names) = by_index.get(&idx) {
                for name in names {
                    let _ = writeln!(out, "      l {}", name);
                }
            }
            if let Some(inst) = self.instructions.get(idx) {
                let _ = writeln!(out, "{:>4}  {}", idx, inst);
            }
        }
        out
    }

    /// Hex SHA-256 of the disassembly. Equal for programs that decode to the
    /// same instructions and labels, whatever their comments or spacing.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.disassemble().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
