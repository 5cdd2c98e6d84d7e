/// Opaque checkpoint into a [`Scanner`], obtained from [`Scanner::position`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Position(usize);

/// Character cursor over a single line of input.
///
/// The scanner never sees line terminators; the caller feeds it one line at a
/// time. Positions are byte offsets and only meaningful for the line the
/// scanner was created over.
#[derive(Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    index: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, index: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.text[self.index..].chars().next()
    }

    /// Consumes and returns the next character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += c.len_utf8();
        Some(c)
    }

    /// Consumes the next character only when it equals `expected`.
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.index += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skips a run of ASCII whitespace and returns how many characters were
    /// skipped.
    pub fn whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\n' | '\u{000B}' | '\u{000C}' | '\r' => {
                    self.index += 1;
                    skipped += 1;
                }
                _ => break,
            }
        }
        skipped
    }

    pub fn position(&self) -> Position {
        Position(self.index)
    }

    pub fn text_between(&self, start: Position, end: Position) -> &'a str {
        &self.text[start.0..end.0]
    }
}
