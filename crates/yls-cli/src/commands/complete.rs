//! Complete command - prints completion items for one cursor position.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::executor::block_on;
use lsp_types::{CompletionList, Position};
use tracing::debug;
use yls_config::{CONFIG_FILENAME, YlsConfig};
use yls_document::TextDocument;
use yls_editor_support::uri::path_to_uri;
use yls_editor_support::{CompletionEngine, SchemaManager};
use yls_schema::{FixedSchemaResolver, SchemaNode, SchemaResolver};
use yls_tree::parse_tolerant;

use crate::util::read_input;

#[derive(clap::Args)]
pub struct Args {
    /// Path to the YAML file
    pub file: String,

    /// Zero-based line of the cursor
    #[arg(short, long)]
    pub line: u32,

    /// Zero-based UTF-16 column of the cursor
    #[arg(short, long)]
    pub character: u32,

    /// Path to schema file (overrides the associations in yls.json)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let text = read_input(Some(&args.file))?;
    let path = Path::new(&args.file);
    let document = TextDocument::new(path_to_uri(path), text);
    let parsed = parse_tolerant(document.get_text());
    for error in &parsed.errors {
        debug!(%error, "tolerated parse error");
    }
    let position = Position::new(args.line, args.character);

    let list = match &args.schema {
        Some(schema_path) => {
            let schema = SchemaNode::from_file(schema_path)
                .with_context(|| format!("Error loading schema {}", schema_path.display()))?;
            let engine = CompletionEngine::new(FixedSchemaResolver::new(schema));
            complete(&engine, &document, position, &parsed.ast)
        }
        None => {
            let start_dir = std::path::absolute(path)?
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            match YlsConfig::load_from_dir(&start_dir)
                .with_context(|| format!("Error loading {CONFIG_FILENAME}"))?
            {
                Some((_, config)) if !config.completion => {
                    debug!("completion disabled by config");
                    CompletionList::default()
                }
                Some((config_path, config)) => {
                    let config_dir = config_path.parent().unwrap_or(Path::new("."));
                    let manager = SchemaManager::from_config(&config, config_dir)?;
                    complete(&CompletionEngine::new(manager), &document, position, &parsed.ast)
                }
                None => {
                    debug!("no {CONFIG_FILENAME} found, no schema applies");
                    CompletionList::default()
                }
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

fn complete<R>(
    engine: &CompletionEngine<R>,
    document: &TextDocument,
    position: Position,
    ast: &yls_tree::YamlAst,
) -> CompletionList
where
    R: SchemaResolver<Error = std::convert::Infallible>,
{
    block_on(engine.complete(document, position, ast)).unwrap_or_else(|never| match never {})
}
