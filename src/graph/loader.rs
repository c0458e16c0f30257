//! Schema Loading
//!
//! Collects `.avsc` files from paths and directories and parses them in
//! order with one parser, so a file may use types defined by files before
//! it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;
use walkdir::WalkDir;

use crate::parser::Parser;
use crate::schema::Schema;

/// Configuration for schema loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extension searched for inside directories
    pub extension: String,
    /// Skip files whose path relative to the searched directory starts with these
    pub skip_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extension: "avsc".to_string(),
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
        }
    }
}

/// Schema files under `paths`: files as given, directories searched
/// recursively (sorted within each directory)
pub fn schema_files(paths: &[PathBuf], config: &LoadConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|ext| ext == config.extension.as_str()))
            .filter(|p| {
                let relative = p.strip_prefix(path).unwrap_or(p.as_path()).to_string_lossy();
                !config.skip_prefixes.iter().any(|prefix| relative.starts_with(prefix))
            })
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

/// Parse one schema file
pub fn load_file(parser: &mut Parser, path: &Path) -> anyhow::Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let schema = parser
        .parse(&text)
        .with_context(|| format!("Failed to parse schema in {}", path.display()))?;
    debug!(path = %path.display(), name = %schema.fullname(), "loaded schema");
    Ok(schema)
}

/// Parse every schema file in a directory, in path order
pub fn load_from_directory(
    parser: &mut Parser,
    dir: &Path,
    config: &LoadConfig,
) -> anyhow::Result<Vec<Schema>> {
    schema_files(&[dir.to_path_buf()], config)
        .iter()
        .map(|path| load_file(parser, path))
        .collect()
}
