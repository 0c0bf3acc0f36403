//! Inspect command - prints the syntax tree and any tolerated parse errors.

use yls_document::LineIndex;
use yls_tree::parse_tolerant;

use crate::util::{display_path, read_input};

#[derive(clap::Args)]
pub struct Args {
    /// Path to YAML file to inspect (use '-' or omit for stdin)
    pub file: Option<String>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let contents = read_input(args.file.as_deref())?;
    let parsed = parse_tolerant(&contents);

    if !parsed.errors.is_empty() {
        let index = LineIndex::new(&contents);
        let path = display_path(args.file.as_deref());
        for error in &parsed.errors {
            let position = index.position(error.span.start, &contents);
            eprintln!(
                "{path}:{}:{}: {}",
                position.line + 1,
                position.character + 1,
                error.kind
            );
        }
        eprintln!("Note: Showing partial syntax tree below");
        eprintln!();
    }

    let mut out = String::new();
    parsed.ast.inspect(&mut out)?;
    print!("{out}");
    Ok(())
}
