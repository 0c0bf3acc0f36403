use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use lsp_types::{CompletionItem, Documentation};
use serde::Deserialize;

/// Marks the cursor inside [`TestCase::editor`].
pub const CURSOR_MARKER: &str = "|_|";

#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
    /// Editor content with the cursor marked as `|_|`
    pub editor: String,
    /// Schema bound to the document. Absent means no schema applies.
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
    /// Expected completions (exact match, in order)
    pub completions: Vec<ExpectedCompletion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedCompletion {
    pub label: String,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl ExpectedCompletion {
    pub fn from_item(item: &CompletionItem) -> Self {
        Self {
            label: item.label.clone(),
            documentation: item.documentation.as_ref().map(|doc| match doc {
                Documentation::String(text) => text.clone(),
                Documentation::MarkupContent(markup) => markup.value.clone(),
            }),
        }
    }
}

impl TestCase {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read test file: {}", path.display()))?;
        let mut case: TestCase =
            serde_json::from_str(&content).context("Failed to parse test case")?;
        case.path = path.to_path_buf();
        Ok(case)
    }

    /// Editor text without the marker, and the byte offset the marker stood at.
    pub fn split_cursor(&self) -> Result<(String, usize)> {
        let mut found = self.editor.match_indices(CURSOR_MARKER);
        let Some((offset, _)) = found.next() else {
            bail!("editor has no {CURSOR_MARKER} cursor marker");
        };
        if found.next().is_some() {
            bail!("editor has more than one {CURSOR_MARKER} cursor marker");
        }
        let text = self.editor.replacen(CURSOR_MARKER, "", 1);
        Ok((text, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(editor: &str) -> TestCase {
        TestCase {
            path: PathBuf::new(),
            description: None,
            editor: editor.to_string(),
            schema: None,
            completions: vec![],
        }
    }

    #[test]
    fn test_split_cursor() {
        let (text, offset) = case("spec:\n  con|_|").split_cursor().unwrap();
        assert_eq!(text, "spec:\n  con");
        assert_eq!(offset, 11);
    }

    #[test]
    fn test_split_cursor_requires_exactly_one_marker() {
        assert!(case("kind: ").split_cursor().is_err());
        assert!(case("|_|a|_|").split_cursor().is_err());
    }
}
