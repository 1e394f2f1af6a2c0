use std::path::PathBuf;

use crate::definition::DefinitionKind;

/// Alias for `Result<T, DataLoadError>`.
pub type DataResult<T> = Result<T, DataLoadError>;

/// Errors that can occur while loading a content root.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The content root does not exist.
    #[error("content root not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The content root exists but is not a directory.
    #[error("content root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A directory or file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A definition file is not valid JSON or does not match the schema.
    #[error("malformed definitions in {}: {source}", path.display())]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },

    /// The content root holds no definitions at all.
    #[error("no definitions found in {}", .0.display())]
    Empty(PathBuf),

    /// Two definitions of the same kind share a name.
    #[error("duplicate {kind} definition: \"{name}\"")]
    DuplicateDefinition {
        /// The kind of the clashing definitions.
        kind: DefinitionKind,
        /// The shared name.
        name: String,
    },

    /// A unit names a parent that is not defined.
    #[error("unit \"{unit}\" inherits from unknown unit \"{parent}\"")]
    UnknownParent {
        /// The inheriting unit.
        unit: String,
        /// The missing parent.
        parent: String,
    },

    /// Following parent links leads back to the starting unit.
    #[error("inheritance cycle through unit \"{0}\"")]
    InheritanceCycle(String),
}
