use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single declarative definition, tagged by `"type"` in content files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Definition {
    /// Session-wide settings. At most one per content root.
    Settings(SettingsDef),
    /// A participating player.
    Player(PlayerDef),
    /// A unit prototype or placed unit.
    Unit(UnitDef),
    /// The terrain grid. At most one per content root.
    Terrain(TerrainDef),
    /// A rule that ends the session when met.
    WinCondition(WinConditionDef),
}

impl Definition {
    /// The kind of this definition.
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Self::Settings(_) => DefinitionKind::Settings,
            Self::Player(_) => DefinitionKind::Player,
            Self::Unit(_) => DefinitionKind::Unit,
            Self::Terrain(_) => DefinitionKind::Terrain,
            Self::WinCondition(_) => DefinitionKind::WinCondition,
        }
    }

    /// The definition's name. Settings are always named `"settings"`.
    pub fn name(&self) -> &str {
        match self {
            Self::Settings(_) => "settings",
            Self::Player(p) => &p.name,
            Self::Unit(u) => &u.name,
            Self::Terrain(t) => &t.name,
            Self::WinCondition(w) => &w.name,
        }
    }
}

/// Discriminant of [`Definition`], used for indexing and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// See [`Definition::Settings`].
    Settings,
    /// See [`Definition::Player`].
    Player,
    /// See [`Definition::Unit`].
    Unit,
    /// See [`Definition::Terrain`].
    Terrain,
    /// See [`Definition::WinCondition`].
    WinCondition,
}

impl DefinitionKind {
    /// Parse a kind from its snake_case name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "settings" => Some(Self::Settings),
            "player" => Some(Self::Player),
            "unit" => Some(Self::Unit),
            "terrain" => Some(Self::Terrain),
            "win_condition" => Some(Self::WinCondition),
            _ => None,
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings => write!(f, "settings"),
            Self::Player => write!(f, "player"),
            Self::Unit => write!(f, "unit"),
            Self::Terrain => write!(f, "terrain"),
            Self::WinCondition => write!(f, "win_condition"),
        }
    }
}

/// Session settings. Every field is optional; consumers apply defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsDef {
    /// Display name of the session.
    pub name: Option<String>,
    /// RNG seed for deterministic placement.
    pub seed: Option<u64>,
    /// Simulation time between universe updates.
    pub update_interval: Option<u64>,
    /// Maximum number of dispatched events kept for inspection.
    pub max_log: Option<usize>,
}

/// A player taking part in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDef {
    /// Unique player name.
    pub name: String,
    /// Optional team number. Players without a team play alone.
    #[serde(default)]
    pub team: Option<u32>,
}

/// A position on the terrain grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    /// Column, starting at 0.
    pub x: u32,
    /// Row, starting at 0.
    pub y: u32,
}

impl TilePos {
    /// Create a position from its coordinates.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit definition as written in a content file, before inheritance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    /// Unique unit name.
    pub name: String,
    /// Name of the unit this one inherits unset fields from.
    #[serde(default)]
    pub parent: Option<String>,
    /// Abstract units are prototypes and are never instantiated.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Starting hit points.
    #[serde(default)]
    pub hit_points: Option<u32>,
    /// Simulation time the unit lives before it is removed.
    #[serde(default)]
    pub lifespan: Option<u64>,
    /// How many instances to create at session start (default 1).
    #[serde(default)]
    pub count: Option<u32>,
    /// Name of the owning player. Unowned units are neutral.
    #[serde(default)]
    pub owner: Option<String>,
    /// Fixed spawn position. Unplaced units get a seeded random tile.
    #[serde(default)]
    pub position: Option<TilePos>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Arbitrary key-value properties.
    #[serde(default)]
    pub properties: BTreeMap<String, MetadataValue>,
}

fn default_tile() -> String {
    "grass".to_string()
}

/// The terrain grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDef {
    /// Terrain name.
    pub name: String,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Tile type filling the grid.
    #[serde(default = "default_tile")]
    pub tile: String,
}

impl Default for TerrainDef {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            width: 16,
            height: 16,
            tile: default_tile(),
        }
    }
}

/// A named win condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinConditionDef {
    /// Unique condition name.
    pub name: String,
    /// The rule that decides when the condition is met.
    pub rule: WinRule,
}

/// The rule behind a [`WinConditionDef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WinRule {
    /// Met once simulation time reaches `time`.
    SurviveUntil {
        /// The simulation time to reach.
        time: u64,
    },
    /// Met when at most one player still owns live units.
    LastPlayerStanding,
    /// Met when no live unit of the named definition (or its descendants) remains.
    DestroyUnit {
        /// The unit definition to destroy.
        unit: String,
    },
}

impl fmt::Display for WinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurviveUntil { time } => write!(f, "survive until t={time}"),
            Self::LastPlayerStanding => write!(f, "last player standing"),
            Self::DestroyUnit { unit } => write!(f, "destroy every {unit}"),
        }
    }
}

/// A flexible property value that supports common types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    String(String),
    /// An ordered list of values.
    List(Vec<MetadataValue>),
    /// A string-keyed map of values.
    Map(BTreeMap<String, MetadataValue>),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(_) => write!(f, "{{...}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_definition_from_json() {
        let def: Definition = serde_json::from_str(
            r#"{"type": "unit", "name": "archer", "parent": "soldier", "hit_points": 30,
                "position": {"x": 2, "y": 3}, "properties": {"range": 5}}"#,
        )
        .unwrap();
        let Definition::Unit(unit) = def else {
            panic!("expected a unit");
        };
        assert_eq!(unit.parent.as_deref(), Some("soldier"));
        assert_eq!(unit.hit_points, Some(30));
        assert_eq!(unit.position, Some(TilePos::new(2, 3)));
        assert_eq!(unit.properties["range"], MetadataValue::Integer(5));
        assert!(!unit.is_abstract);
    }

    #[test]
    fn abstract_flag_uses_keyword_name() {
        let def: Definition =
            serde_json::from_str(r#"{"type": "unit", "name": "soldier", "abstract": true}"#)
                .unwrap();
        assert!(matches!(def, Definition::Unit(UnitDef { is_abstract: true, .. })));
    }

    #[test]
    fn win_rules_from_json() {
        let def: Definition = serde_json::from_str(
            r#"{"type": "win_condition", "name": "wonder", "rule": {"kind": "survive_until", "time": 500}}"#,
        )
        .unwrap();
        assert_eq!(def.kind(), DefinitionKind::WinCondition);
        assert_eq!(def.name(), "wonder");

        let rule: WinRule = serde_json::from_str(r#"{"kind": "last_player_standing"}"#).unwrap();
        assert_eq!(rule, WinRule::LastPlayerStanding);

        let rule: WinRule =
            serde_json::from_str(r#"{"kind": "destroy_unit", "unit": "king"}"#).unwrap();
        assert_eq!(rule.to_string(), "destroy every king");
    }

    #[test]
    fn terrain_tile_defaults_to_grass() {
        let def: Definition =
            serde_json::from_str(r#"{"type": "terrain", "name": "plain", "width": 4, "height": 2}"#)
                .unwrap();
        let Definition::Terrain(terrain) = def else {
            panic!("expected terrain");
        };
        assert_eq!(terrain.tile, "grass");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Definition, _> =
            serde_json::from_str(r#"{"type": "spaceship", "name": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn kind_parse_round_trips_display() {
        for kind in [
            DefinitionKind::Settings,
            DefinitionKind::Player,
            DefinitionKind::Unit,
            DefinitionKind::Terrain,
            DefinitionKind::WinCondition,
        ] {
            assert_eq!(DefinitionKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(DefinitionKind::parse("monster"), None);
    }
}
