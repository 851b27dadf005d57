//! Output device: bits written to `out`, grouped into bytes

use std::io::{self, Write};

use serde::Serialize;

use super::opcodes::Bit;

pub const BITS_PER_BYTE: usize = 8;

/// Receives every bit written to `out`, and every completed byte.
pub trait BitSink {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()>;
    fn on_byte(&mut self, byte: u8) -> io::Result<()>;
}

impl<K: BitSink + ?Sized> BitSink for &mut K {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()> {
        (**self).on_bit(bit)
    }

    fn on_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).on_byte(byte)
    }
}

impl<K: BitSink + ?Sized> BitSink for Box<K> {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()> {
        (**self).on_bit(bit)
    }

    fn on_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).on_byte(byte)
    }
}

/// Collects output bits least significant first until a byte is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteAccumulator {
    bits: Vec<Bit>,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self {
            bits: Vec::with_capacity(BITS_PER_BYTE),
        }
    }

    /// Add a bit. Returns the byte once eight bits are in, and starts over.
    pub fn push(&mut self, bit: Bit) -> Option<u8> {
        self.bits.push(bit);
        if self.bits.len() < BITS_PER_BYTE {
            return None;
        }
        let byte = self
            .bits
            .drain(..)
            .enumerate()
            .fold(0u8, |acc, (k, bit)| acc | (u8::from(bit) << k));
        Some(byte)
    }

    /// Bits of an incomplete byte.
    pub fn pending(&self) -> &[Bit] {
        &self.bits
    }
}

/// Prints `out: <bit>` per bit and `n: <byte>` per byte.
pub struct ConsoleSink<W = io::Stdout> {
    writer: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BitSink for ConsoleSink<W> {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()> {
        writeln!(self.writer, "out: {}", bit)
    }

    fn on_byte(&mut self, byte: u8) -> io::Result<()> {
        writeln!(self.writer, "n: {}", byte)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "lowercase")]
enum OutputEvent {
    Bit(u8),
    Byte(u8),
}

/// One JSON object per line: `{"event":"bit","value":1}` and
/// `{"event":"byte","value":5}`.
pub struct JsonLinesSink<W = io::Stdout> {
    writer: W,
}

impl JsonLinesSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &OutputEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(self.writer)
    }
}

impl<W: Write> BitSink for JsonLinesSink<W> {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()> {
        self.emit(&OutputEvent::Bit(bit.into()))
    }

    fn on_byte(&mut self, byte: u8) -> io::Result<()> {
        self.emit(&OutputEvent::Byte(byte))
    }
}

/// Keeps everything it is sent. Meant for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub bits: Vec<Bit>,
    pub bytes: Vec<u8>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded bits as 0/1 integers.
    pub fn bit_values(&self) -> Vec<u8> {
        self.bits.iter().map(|b| u8::from(*b)).collect()
    }
}

impl BitSink for RecordingSink {
    fn on_bit(&mut self, bit: Bit) -> io::Result<()> {
        self.bits.push(bit);
        Ok(())
    }

    fn on_byte(&mut self, byte: u8) -> io::Result<()> {
        self.bytes.push(byte);
        Ok(())
    }
}
