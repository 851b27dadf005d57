//! Input device: where reads from the `in` address get their bits

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::error::{Error, Result};

use super::opcodes::Bit;

/// Supplies raw responses for reads from `in`.
///
/// A source only hands over what it has; deciding whether a response is a
/// valid bit (and asking again if not) is [`read_input_bit`]'s job. `Ok(None)`
/// means the source will never produce anything again.
pub trait BitSource {
    fn request(&mut self) -> io::Result<Option<String>>;
}

impl<S: BitSource + ?Sized> BitSource for &mut S {
    fn request(&mut self) -> io::Result<Option<String>> {
        (**self).request()
    }
}

impl<S: BitSource + ?Sized> BitSource for Box<S> {
    fn request(&mut self) -> io::Result<Option<String>> {
        (**self).request()
    }
}

/// Prompts on stdout and reads one line from stdin per request.
pub struct ConsoleSource<R = io::StdinLock<'static>> {
    reader: R,
    prompt: String,
}

impl ConsoleSource {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> ConsoleSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prompt: "bit? ".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }
}

impl<R: BufRead> BitSource for ConsoleSource<R> {
    fn request(&mut self) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", self.prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Replays a fixed list of responses, then reports end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    responses: VecDeque<String>,
    served: usize,
}

impl ScriptedSource {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            served: 0,
        }
    }

    pub fn from_bits(bits: &[u8]) -> Self {
        Self::new(bits.iter().map(|b| b.to_string()))
    }

    /// How many responses have been handed out so far.
    pub fn served(&self) -> usize {
        self.served
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl BitSource for ScriptedSource {
    fn request(&mut self) -> io::Result<Option<String>> {
        let next = self.responses.pop_front();
        if next.is_some() {
            self.served += 1;
        }
        Ok(next)
    }
}

/// Block on `source` until it yields a 0 or 1.
///
/// Unparseable and out-of-range responses are discarded and the source is
/// asked again. With `max_retries` unset this repeats forever; with
/// `Some(n)` up to `n` bad responses are tolerated.
pub fn read_input_bit<S>(source: &mut S, max_retries: Option<usize>) -> Result<Bit>
where
    S: BitSource + ?Sized,
{
    let mut rejected = 0usize;
    loop {
        let raw = source.request()?.ok_or(Error::InputClosed)?;
        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| Bit::try_from(v).ok());
        if let Some(bit) = parsed {
            return Ok(bit);
        }

        rejected += 1;
        debug!(response = raw.trim(), rejected, "discarding invalid input");
        if let Some(limit) = max_retries {
            if rejected > limit {
                return Err(Error::InputRetriesExceeded(rejected));
            }
        }
    }
}
