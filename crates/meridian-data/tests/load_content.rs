//! Integration tests for content loading.
use std::fs;

use meridian_data::{DataLoadError, DataStore, DefinitionKind, MetadataValue, TilePos, WinRule};
use tempfile::TempDir;

fn content() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("game.json"),
        r#"[
    {"type": "settings", "name": "Delta", "seed": 3, "max_log": 50},
    {"type": "terrain", "name": "marsh", "width": 10, "height": 6, "tile": "mud"},
    {"type": "player", "name": "north", "team": 1},
    {"type": "player", "name": "south"}
]"#,
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("units/naval")).unwrap();
    fs::write(
        dir.path().join("units/base.json"),
        r#"[
    {"type": "unit", "name": "vessel", "abstract": true, "hit_points": 80,
     "tags": ["naval"], "properties": {"speed": 2, "crew": 10}}
]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("units/naval/boats.json"),
        r#"[
    {"type": "unit", "name": "galley", "parent": "vessel", "owner": "north",
     "position": {"x": 1, "y": 2}, "properties": {"speed": 3}},
    {"type": "unit", "name": "barge", "parent": "galley", "count": 2, "lifespan": 40}
]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("rules.json"),
        r#"[
    {"type": "win_condition", "name": "sink", "rule": {"kind": "destroy_unit", "unit": "vessel"}},
    {"type": "win_condition", "name": "hold", "rule": {"kind": "survive_until", "time": 300}}
]"#,
    )
    .unwrap();
    fs::write(dir.path().join("NOTES.txt"), "not a definition file").unwrap();
    dir
}

#[test]
fn loads_a_nested_content_root() {
    let dir = content();
    let store = DataStore::load(dir.path()).unwrap();

    assert_eq!(store.root(), dir.path());
    assert_eq!(store.sources().len(), 4);
    assert_eq!(store.len(), 9);
    assert_eq!(store.settings().unwrap().max_log, Some(50));
    assert_eq!(store.terrain().unwrap().tile, "mud");
    assert_eq!(store.player("north").unwrap().team, Some(1));

    let counts = store.counts_by_kind();
    assert_eq!(counts[&DefinitionKind::Unit], 3);
    assert_eq!(counts[&DefinitionKind::WinCondition], 2);
}

#[test]
fn inheritance_runs_through_files() {
    let dir = content();
    let store = DataStore::load(dir.path()).unwrap();

    let barge = store.unit("barge").unwrap();
    assert_eq!(barge.ancestry, vec!["vessel", "galley"]);
    assert_eq!(barge.hit_points, Some(80));
    assert_eq!(barge.lifespan, Some(40));
    assert_eq!(barge.count, 2);
    assert_eq!(barge.owner, None);
    assert_eq!(barge.position, None);
    assert_eq!(barge.tags, vec!["naval"]);
    assert_eq!(barge.properties["speed"], MetadataValue::Integer(3));
    assert_eq!(barge.properties["crew"], MetadataValue::Integer(10));
    assert!(barge.is_a("vessel"));

    let galley = store.unit("galley").unwrap();
    assert_eq!(galley.position, Some(TilePos::new(1, 2)));

    let names: Vec<_> = store.instantiable_units().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["galley", "barge"]);
}

#[test]
fn win_conditions_keep_definition_order() {
    let dir = content();
    let store = DataStore::load(dir.path()).unwrap();
    let rules: Vec<_> = store.win_conditions().iter().map(|w| &w.rule).collect();
    assert_eq!(
        rules,
        vec![
            &WinRule::DestroyUnit {
                unit: "vessel".into()
            },
            &WinRule::SurviveUntil { time: 300 },
        ]
    );
}

#[test]
fn duplicate_across_files_rejected() {
    let dir = content();
    fs::write(
        dir.path().join("zz_extra.json"),
        r#"[{"type": "player", "name": "south"}]"#,
    )
    .unwrap();
    let err = DataStore::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        DataLoadError::DuplicateDefinition {
            kind: DefinitionKind::Player,
            ref name,
        } if name == "south"
    ));
}

#[test]
fn second_settings_rejected() {
    let dir = content();
    fs::write(
        dir.path().join("more_settings.json"),
        r#"[{"type": "settings", "seed": 9}]"#,
    )
    .unwrap();
    let err = DataStore::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        DataLoadError::DuplicateDefinition {
            kind: DefinitionKind::Settings,
            ..
        }
    ));
}

#[test]
fn broken_parent_chain_rejected() {
    let dir = content();
    fs::write(
        dir.path().join("units/orphans.json"),
        r#"[{"type": "unit", "name": "raft", "parent": "canoe"}]"#,
    )
    .unwrap();
    let err = DataStore::load(dir.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unit \"raft\" inherits from unknown unit \"canoe\""
    );
}
