use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::definition::{
    Definition, DefinitionKind, PlayerDef, SettingsDef, TerrainDef, UnitDef, WinConditionDef,
};
use crate::error::{DataLoadError, DataResult};
use crate::loader::load_dir;
use crate::resolve::{ResolvedUnit, resolve_units};

/// The loaded definition database. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    root: PathBuf,
    sources: Vec<PathBuf>,
    settings: Option<SettingsDef>,
    terrain: Option<TerrainDef>,
    players: Vec<PlayerDef>,
    units: Vec<ResolvedUnit>,
    win_conditions: Vec<WinConditionDef>,

    // Indexes
    unit_index: HashMap<String, usize>,
    player_index: HashMap<String, usize>,
}

impl DataStore {
    /// Load every definition under a content root.
    pub fn load(root: &Path) -> DataResult<Self> {
        let loaded = load_dir(root)?;
        let mut store = Self::from_definitions(loaded.definitions)?;
        store.root = root.to_path_buf();
        store.sources = loaded.files;
        tracing::info!(
            root = %root.display(),
            files = store.sources.len(),
            definitions = store.len(),
            "loaded game data"
        );
        Ok(store)
    }

    /// Build a store from in-memory definitions.
    ///
    /// Rejects duplicate names per kind, a second settings or terrain
    /// definition, and broken unit inheritance.
    pub fn from_definitions(definitions: Vec<Definition>) -> DataResult<Self> {
        let mut seen: HashSet<(DefinitionKind, String)> = HashSet::new();
        let mut settings = None;
        let mut terrain = None;
        let mut players = Vec::new();
        let mut unit_defs: Vec<UnitDef> = Vec::new();
        let mut win_conditions = Vec::new();

        for def in definitions {
            let kind = def.kind();
            // Settings and terrain are singletons regardless of name
            let key = match kind {
                DefinitionKind::Settings | DefinitionKind::Terrain => kind.to_string(),
                _ => def.name().to_string(),
            };
            if !seen.insert((kind, key)) {
                return Err(DataLoadError::DuplicateDefinition {
                    kind,
                    name: def.name().to_string(),
                });
            }

            match def {
                Definition::Settings(s) => settings = Some(s),
                Definition::Terrain(t) => terrain = Some(t),
                Definition::Player(p) => players.push(p),
                Definition::Unit(u) => unit_defs.push(u),
                Definition::WinCondition(w) => win_conditions.push(w),
            }
        }

        let units = resolve_units(&unit_defs)?;
        let unit_index = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.name.clone(), i))
            .collect();
        let player_index = players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        Ok(Self {
            root: PathBuf::new(),
            sources: Vec::new(),
            settings,
            terrain,
            players,
            units,
            win_conditions,
            unit_index,
            player_index,
        })
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Get a resolved unit by name.
    pub fn unit(&self, name: &str) -> Option<&ResolvedUnit> {
        self.unit_index.get(name).map(|&i| &self.units[i])
    }

    /// Get a player by name.
    pub fn player(&self, name: &str) -> Option<&PlayerDef> {
        self.player_index.get(name).map(|&i| &self.players[i])
    }

    /// Get a win condition by name.
    pub fn win_condition(&self, name: &str) -> Option<&WinConditionDef> {
        self.win_conditions.iter().find(|w| w.name == name)
    }

    /// All resolved units, in definition order.
    pub fn units(&self) -> impl Iterator<Item = &ResolvedUnit> {
        self.units.iter()
    }

    /// Units that are instantiated at session start.
    pub fn instantiable_units(&self) -> impl Iterator<Item = &ResolvedUnit> {
        self.units.iter().filter(|u| !u.is_abstract)
    }

    /// All players, in definition order.
    pub fn players(&self) -> &[PlayerDef] {
        &self.players
    }

    /// All win conditions, in definition order.
    pub fn win_conditions(&self) -> &[WinConditionDef] {
        &self.win_conditions
    }

    /// The settings definition, if any.
    pub fn settings(&self) -> Option<&SettingsDef> {
        self.settings.as_ref()
    }

    /// The terrain definition, if any.
    pub fn terrain(&self) -> Option<&TerrainDef> {
        self.terrain.as_ref()
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// The content root this store was loaded from. Empty for in-memory stores.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files the definitions were read from.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Total number of definitions.
    pub fn len(&self) -> usize {
        usize::from(self.settings.is_some())
            + usize::from(self.terrain.is_some())
            + self.players.len()
            + self.units.len()
            + self.win_conditions.len()
    }

    /// Returns `true` if the store holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count definitions by kind. Kinds with no definitions are omitted.
    pub fn counts_by_kind(&self) -> BTreeMap<DefinitionKind, usize> {
        [
            (DefinitionKind::Settings, usize::from(self.settings.is_some())),
            (DefinitionKind::Player, self.players.len()),
            (DefinitionKind::Unit, self.units.len()),
            (DefinitionKind::Terrain, usize::from(self.terrain.is_some())),
            (DefinitionKind::WinCondition, self.win_conditions.len()),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}
