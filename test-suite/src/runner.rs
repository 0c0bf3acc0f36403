use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use futures::executor::block_on;
use yls_document::TextDocument;
use yls_editor_support::CompletionEngine;
use yls_schema::{FixedSchemaResolver, SchemaNode};
use yls_tree::parse_tolerant;

use crate::{ExpectedCompletion, TestCase, TestFailure, TestResults};

pub struct TestRunner {
    cases_dir: PathBuf,
    filter: Option<String>,
}

impl TestRunner {
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
            filter: None,
        }
    }

    /// Only run cases whose name contains `filter`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Discover and run all test cases
    pub fn run_all(&self) -> Result<TestResults> {
        let mut results = TestResults::new();
        for path in self.discover_test_files()? {
            let name = self.case_name(&path);
            if self.filter.as_ref().is_some_and(|filter| !name.contains(filter)) {
                continue;
            }
            match TestCase::load(&path).and_then(|case| run_case(&case)) {
                Ok(()) => results.add_pass(),
                Err(e) => results.add_failure(TestFailure::new(name, format!("{e:#}"))),
            }
        }
        Ok(results)
    }

    /// Discover all .json case files, sorted by path
    pub fn discover_test_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.cases_dir.join("**").join("*.json");
        let pattern = pattern
            .to_str()
            .context("cases directory is not valid UTF-8")?;
        let mut files = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        files.sort();
        Ok(files)
    }

    /// Case path relative to the cases directory, without extension
    pub fn case_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.cases_dir)
            .unwrap_or(path)
            .with_extension("")
            .display()
            .to_string()
    }
}

/// Run one case against the completion engine.
pub fn run_case(case: &TestCase) -> Result<()> {
    let (text, offset) = case.split_cursor()?;
    let resolver = match &case.schema {
        Some(schema) => {
            let schema: SchemaNode =
                serde_json::from_value(schema.clone()).context("Failed to parse schema")?;
            FixedSchemaResolver::new(schema)
        }
        None => FixedSchemaResolver::empty(),
    };
    let engine = CompletionEngine::new(resolver);

    let document = TextDocument::new("file:///test-suite/case.yaml", text);
    let ast = parse_tolerant(document.get_text()).ast;
    let position = document.position_at(offset);
    let list = block_on(engine.complete(&document, position, &ast))
        .unwrap_or_else(|never| match never {});

    if list.is_incomplete {
        bail!("completion list is marked incomplete");
    }
    let actual: Vec<_> = list.items.iter().map(ExpectedCompletion::from_item).collect();
    if actual != case.completions {
        bail!(
            "Completion mismatch.\nExpected: {:?}\nActual: {:?}",
            case.completions,
            actual
        );
    }
    Ok(())
}
