//! Scan position over an immutable wikitext buffer.
//!
//! A `Cursor` never copies the text. Saving a position is just copying a
//! `Mark`, and restoring is assigning it back, so backtracking is O(1).

use regex::Regex;

/// Where the cursor is: byte offset plus 1-based line and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

/// A saved cursor position, handed back to `Cursor::restore`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark(Position);

impl Mark {
    pub fn offset(&self) -> usize {
        self.0.offset
    }
}

#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: Position::START,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn offset(&self) -> usize {
        self.pos.offset
    }

    pub fn save(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn restore(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    /// True only at the very end of the buffer.
    pub fn at_end(&self) -> bool {
        self.pos.offset >= self.text.len()
    }

    /// Everything from the current position onwards.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos.offset..]
    }

    /// Text starting at an absolute byte offset (empty when out of range or
    /// not on a char boundary).
    pub fn peek_from(&self, offset: usize) -> &'a str {
        self.text.get(offset..).unwrap_or("")
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Up to `width` characters of text at the current position, for logs and
    /// error messages.
    pub fn nearby(&self, width: usize) -> String {
        self.rest().chars().take(width).collect()
    }

    /// Consume `len` bytes, keeping line/column in step. `len` must land on a
    /// char boundary.
    pub fn advance(&mut self, len: usize) -> &'a str {
        let start = self.pos.offset;
        let end = (start + len).min(self.text.len());
        let consumed = &self.text[start..end];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.pos.line += 1;
                self.pos.column = 1;
            } else {
                self.pos.column += 1;
            }
        }
        self.pos.offset = end;
        consumed
    }

    /// Skip any run of whitespace at the cursor.
    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start().len();
        if len > 0 {
            self.advance(len);
        }
    }

    /// Match `pattern` at the cursor (it must start right here) and consume it.
    pub fn eat_regex(&mut self, pattern: &Regex) -> Option<&'a str> {
        let found = pattern.find(self.rest())?;
        if found.start() != 0 || found.is_empty() {
            return None;
        }
        Some(self.advance(found.end()))
    }

    /// Byte distance from the cursor to the first match of `pattern`, if any.
    pub fn distance_to(&self, pattern: &Regex) -> Option<usize> {
        pattern.find(self.rest()).map(|m| m.start())
    }
}
