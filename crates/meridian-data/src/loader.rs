use std::path::{Path, PathBuf};

use crate::definition::Definition;
use crate::error::{DataLoadError, DataResult};

/// Definitions read from a content root, grouped by source file.
#[derive(Debug, Default)]
pub struct LoadedSources {
    /// Every `*.json` file that was read, in read order.
    pub files: Vec<PathBuf>,
    /// All definitions, in file order then position within the file.
    pub definitions: Vec<Definition>,
}

/// Read every `*.json` file under `root`, recursively, in sorted path order.
///
/// Each file must hold a JSON array of [`Definition`]s. A root that exists
/// but yields no definitions is an error.
pub fn load_dir(root: &Path) -> DataResult<LoadedSources> {
    if !root.exists() {
        return Err(DataLoadError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DataLoadError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_json_files(root, &mut files)?;
    // Sort for deterministic ordering
    files.sort();

    let mut loaded = LoadedSources::default();
    for path in files {
        let definitions = parse_file(&path)?;
        tracing::debug!(
            path = %path.display(),
            count = definitions.len(),
            "read definition file"
        );
        loaded.definitions.extend(definitions);
        loaded.files.push(path);
    }

    if loaded.definitions.is_empty() {
        return Err(DataLoadError::Empty(root.to_path_buf()));
    }
    Ok(loaded)
}

/// Parse a single definition file.
pub fn parse_file(path: &Path) -> DataResult<Vec<Definition>> {
    let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> DataResult<()> {
    let io_err = |source| DataLoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
