//! Declarative game-data store for Meridian.
//!
//! A [`DataStore`] is loaded once from a content root directory holding
//! `*.json` definition files and is read-only afterwards. Unit definitions
//! may inherit from a single parent; inheritance is resolved at load time so
//! that every query returns a flattened [`ResolvedUnit`].

/// Definition types deserialized from content files.
pub mod definition;
/// Error types for loading definitions.
pub mod error;
/// Directory scanning and file parsing.
pub mod loader;
/// Single-parent inheritance resolution for unit definitions.
pub mod resolve;
/// The loaded, queryable definition store.
pub mod store;

/// Re-exports of the definition types.
pub use definition::{
    Definition, DefinitionKind, MetadataValue, PlayerDef, SettingsDef, TerrainDef, TilePos,
    UnitDef, WinConditionDef, WinRule,
};
/// Re-exports of [`error::DataLoadError`] and [`error::DataResult`].
pub use error::{DataLoadError, DataResult};
/// Re-export of [`resolve::ResolvedUnit`].
pub use resolve::ResolvedUnit;
/// Re-export of [`store::DataStore`].
pub use store::DataStore;
