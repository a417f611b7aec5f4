//! Mapping byte offsets in matched text back to lines and columns.

/// A position in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLoc {
    /// Byte offset in the source text.
    pub offset: u32,
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based, counted in characters).
    pub col: u32,
}

impl SourceLoc {
    pub fn new(offset: u32, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Start offsets of every line in a text, for repeated offset lookups.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => starts.push(i + 1),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    starts.push(i + 2);
                    i += 1;
                }
                b'\r' => starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { text, starts }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Location of `offset`. Offsets past the end clamp to the end of the text.
    pub fn locate(&self, offset: usize) -> SourceLoc {
        let offset = self.clamp(offset);
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = self.text[self.starts[line]..offset].chars().count() + 1;
        SourceLoc::new(offset as u32, line as u32 + 1, col as u32)
    }

    /// The line containing `offset`, without its terminator.
    pub fn line_text(&self, offset: usize) -> &'a str {
        let loc = self.locate(offset);
        let start = self.starts[loc.line as usize - 1];
        let end = self.starts.get(loc.line as usize).copied().unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\r', '\n'])
    }

    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

/// Locate a single offset without keeping an index around.
pub fn locate(text: &str, offset: usize) -> SourceLoc {
    LineIndex::new(text).locate(offset)
}
