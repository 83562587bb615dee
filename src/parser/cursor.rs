use super::error::{ParseError, ParseResult};

/// Byte-position cursor over a borrowed string. Every read that can run off
/// the end returns `ScanOverrun` instead of panicking.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Advance one character, failing if there is none.
    pub fn bump(&mut self, expected: &str) -> ParseResult<char> {
        self.advance().ok_or_else(|| self.overrun(expected))
    }

    /// Move to an absolute byte offset previously obtained from this cursor.
    pub fn seek(&mut self, pos: usize) {
        debug_assert!(self.src.is_char_boundary(pos));
        self.pos = pos.min(self.src.len());
    }

    /// Consume a run of `ch` and return its length.
    pub fn count_run(&mut self, ch: char) -> usize {
        let mut n = 0;
        while self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            n += 1;
        }
        n
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consume up to (not including) the next `stop`. The cursor is left on
    /// `stop`.
    pub fn take_until(&mut self, stop: char) -> ParseResult<&'a str> {
        let start = self.pos;
        let offset = self
            .rest()
            .find(stop)
            .ok_or_else(|| self.overrun(&format!("{stop:?}")))?;
        self.pos += offset;
        Ok(&self.src[start..self.pos])
    }

    /// Consume while `pred` holds and return the consumed slice.
    pub fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&mut pred) {
            self.advance();
        }
        &self.src[start..self.pos]
    }

    /// Absolute offset of the next occurrence of `pat`, without moving.
    pub fn find(&self, pat: &str) -> ParseResult<usize> {
        self.rest()
            .find(pat)
            .map(|offset| self.pos + offset)
            .ok_or_else(|| self.overrun(&format!("{pat:?}")))
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }

    fn overrun(&self, expected: &str) -> ParseError {
        ParseError::ScanOverrun {
            pos: self.src.len(),
            expected: expected.to_string(),
        }
    }
}
