pub mod tokens;

use tokens::{SourceLine, BLOCK_BEGIN, BLOCK_END, COMMENT};
use tracing::debug;

/// Splits program text into significant lines.
///
/// Per line, in order: block comment suppression (`#begin:` ... `#end:`,
/// not nested), inline comment stripping, trimming, blank line removal and
/// whitespace tokenization. Scanning cannot fail; malformed lines are the
/// parser's business.
pub struct Lexer<'src> {
    source: &'src str,
    filename: String,
    in_block: bool,
    block_start: usize,
    lines: Vec<SourceLine>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, filename: &str) -> Self {
        Self {
            source,
            filename: filename.to_string(),
            in_block: false,
            block_start: 0,
            lines: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Vec<SourceLine> {
        let source = self.source;
        for (idx, raw) in source.lines().enumerate() {
            self.scan_line(idx + 1, raw);
        }

        if self.in_block {
            debug!(
                file = %self.filename,
                line = self.block_start,
                "block comment runs to end of file"
            );
        }

        self.lines
    }

    fn scan_line(&mut self, number: usize, raw: &str) {
        let trimmed = raw.trim();

        if self.in_block {
            // first `#end:` closes the block, whatever opened it
            if trimmed == BLOCK_END {
                debug!(file = %self.filename, from = self.block_start, to = number, "block comment skipped");
                self.in_block = false;
            }
            return;
        }
        if trimmed == BLOCK_BEGIN {
            self.in_block = true;
            self.block_start = number;
            return;
        }

        let code = match raw.find(COMMENT) {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let text = code.trim();
        if text.is_empty() {
            return;
        }

        self.lines.push(SourceLine {
            number,
            text: text.to_string(),
            tokens: text.split_whitespace().map(str::to_string).collect(),
        });
    }
}
