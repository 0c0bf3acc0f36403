//! Text document model shared by the yls crates.
//!
//! A [`TextDocument`] owns the raw text of one editor buffer together with a
//! [`LineIndex`], and converts LSP positions into byte offsets.

mod line_index;

pub use line_index::LineIndex;
pub use lsp_types::Position;

use std::ops::Range;

/// An immutable snapshot of an editor buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    uri: String,
    text: String,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            uri: uri.into(),
            text,
            line_index,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Byte offset of an LSP position.
    pub fn offset_at(&self, position: Position) -> usize {
        self.line_index.offset(position, &self.text)
    }

    /// LSP position of a byte offset.
    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position(offset, &self.text)
    }

    /// Byte range `[start, end)` of a line, terminator included.
    pub fn line_range(&self, line: u32) -> Option<Range<usize>> {
        self.line_index.line_range(line as usize)
    }

    /// Raw text of a line, terminator included. Empty for lines past the end.
    pub fn line_text(&self, line: u32) -> &str {
        match self.line_range(line) {
            Some(range) => &self.text[range],
            None => "",
        }
    }
}
