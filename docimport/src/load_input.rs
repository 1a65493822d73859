//! Reads the documentation parser's JSON export.
//!
//! The export is either an array of source files or a single source-file
//! object; both load into `Vec<SourceFile>`.

use anyhow::{Context, Result};
use docimport_core::SourceFile;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Deserialize)]
#[serde(untagged)]
enum ParserExport {
    Many(Vec<SourceFile>),
    One(SourceFile),
}

pub fn load_input<P: AsRef<Path>>(path: P) -> Result<Vec<SourceFile>> {
    let path_ref = path.as_ref();
    let raw = std::fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read parser output {}", path_ref.display()))?;
    let export: ParserExport = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse parser output JSON {}", path_ref.display()))?;

    let files = match export {
        ParserExport::Many(files) => files,
        ParserExport::One(file) => vec![file],
    };
    info!(
        input = %path_ref.display(),
        files = files.len(),
        functions = files.iter().map(|f| f.functions.len()).sum::<usize>(),
        classes = files.iter().map(|f| f.classes.len()).sum::<usize>(),
        "Loaded parser output"
    );
    Ok(files)
}
