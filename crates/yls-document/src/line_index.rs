use std::ops::Range;

use lsp_types::Position;

/// Byte offsets of every line start in a text.
///
/// `line_starts[i]` is the byte offset of line `i`; line 0 always starts at 0.
/// `\n`, `\r\n` and a lone `\r` all terminate a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// `[start, end)` of a line, where `end` is the next line's start or the
    /// text length for the last line.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.len);
        Some(start..end)
    }

    /// Line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .iter()
            .rposition(|&start| start <= offset)
            .unwrap_or(0)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// `character` counts UTF-16 code units. Positions past the end of a line
    /// clamp to the line's content, positions past the last line clamp to the
    /// text length.
    pub fn offset(&self, position: Position, text: &str) -> usize {
        let Some(range) = self.line_range(position.line as usize) else {
            return self.len;
        };
        let content = text[range.clone()].trim_end_matches(['\n', '\r']);
        let mut utf16 = 0u32;
        for (i, c) in content.char_indices() {
            if utf16 >= position.character {
                return range.start + i;
            }
            utf16 += c.len_utf16() as u32;
        }
        range.start + content.len()
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// An offset inside a multi-byte character maps to that character's start.
    pub fn position(&self, offset: usize, text: &str) -> Position {
        let mut offset = offset.min(self.len).min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_of(offset);
        let line_start = self.line_starts[line];
        let character: usize = text[line_start..offset]
            .chars()
            .map(|c| c.len_utf16())
            .sum();
        Position {
            line: line as u32,
            character: character as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_starts() {
        let index = LineIndex::new("hello\nworld\n");
        assert_eq!(index.line_starts(), &[0, 6, 12]);
    }

    #[test]
    fn test_line_starts_crlf_and_cr() {
        let index = LineIndex::new("a\r\nb\rc");
        assert_eq!(index.line_starts(), &[0, 3, 5]);
    }

    #[test]
    fn test_line_range_last_line_ends_at_len() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_range(0), Some(0..3));
        assert_eq!(index.line_range(1), Some(3..5));
        assert_eq!(index.line_range(2), None);
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_range(0), Some(0..0));
    }

    #[test]
    fn test_offset_ascii() {
        let text = "hello\nworld\n";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(Position::new(0, 0), text), 0);
        assert_eq!(index.offset(Position::new(1, 3), text), 9);
        // Past the end of line 0 clamps before the newline
        assert_eq!(index.offset(Position::new(0, 40), text), 5);
        // Past the last line clamps to the text length
        assert_eq!(index.offset(Position::new(9, 0), text), 12);
    }

    #[test]
    fn test_offset_utf16() {
        // "😀" is 4 bytes but 2 UTF-16 code units
        let text = "😀a: 日本";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(Position::new(0, 2), text), 4);
        assert_eq!(index.offset(Position::new(0, 3), text), 5);
        assert_eq!(index.offset(Position::new(0, 6), text), 10);
    }

    #[test]
    fn test_position_roundtrip_utf8() {
        let text = "日本語\ntest";
        let index = LineIndex::new(text);
        assert_eq!(index.position(3, text), Position::new(0, 1));
        assert_eq!(index.position(10, text), Position::new(1, 0));
        assert_eq!(index.position(100, text), Position::new(1, 4));
    }

    #[test]
    fn test_position_inside_multibyte_char() {
        let text = "日本語";
        let index = LineIndex::new(text);
        assert_eq!(index.position(1, text), Position::new(0, 0));
        assert_eq!(index.position(5, text), Position::new(0, 1));
    }
}
