use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use meridian_data::{DataStore, DefinitionKind};

pub fn run(dir: &Path, kind: Option<&str>) -> Result<(), String> {
    let filter = match kind {
        Some(k) => Some(DefinitionKind::parse(k).ok_or_else(|| format!("unknown kind '{k}'"))?),
        None => None,
    };
    let data = super::load_dir(dir)?;

    let rows: Vec<[String; 3]> = rows(&data)
        .into_iter()
        .filter(|(k, _)| filter.is_none_or(|f| f == *k))
        .map(|(_, row)| row)
        .collect();

    if rows.is_empty() {
        println!("  No definitions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Details"]);
    for row in &rows {
        table.add_row(row.iter());
    }

    println!("{table}");
    println!();
    println!("  {} definitions", rows.len());

    Ok(())
}

fn rows(data: &DataStore) -> Vec<(DefinitionKind, [String; 3])> {
    let mut rows = Vec::new();

    if let Some(settings) = data.settings() {
        let mut details = Vec::new();
        if let Some(seed) = settings.seed {
            details.push(format!("seed {seed}"));
        }
        if let Some(interval) = settings.update_interval {
            details.push(format!("every {interval}"));
        }
        rows.push((
            DefinitionKind::Settings,
            [
                settings.name.clone().unwrap_or_else(|| "settings".into()),
                DefinitionKind::Settings.to_string(),
                details.join(", "),
            ],
        ));
    }

    for player in data.players() {
        let details = player
            .team
            .map(|t| format!("team {t}"))
            .unwrap_or_default();
        rows.push((
            DefinitionKind::Player,
            [player.name.clone(), DefinitionKind::Player.to_string(), details],
        ));
    }

    for unit in data.units() {
        let mut details = Vec::new();
        if unit.is_abstract {
            details.push("abstract".to_string());
        } else {
            details.push(format!("x{}", unit.count));
        }
        if let Some(parent) = unit.ancestry.last() {
            details.push(format!("is a {parent}"));
        }
        if let Some(hp) = unit.hit_points {
            details.push(format!("{hp} hp"));
        }
        if let Some(owner) = &unit.owner {
            details.push(format!("owned by {owner}"));
        }
        rows.push((
            DefinitionKind::Unit,
            [unit.name.clone(), DefinitionKind::Unit.to_string(), details.join(", ")],
        ));
    }

    if let Some(terrain) = data.terrain() {
        rows.push((
            DefinitionKind::Terrain,
            [
                terrain.name.clone(),
                DefinitionKind::Terrain.to_string(),
                format!("{}x{} {}", terrain.width, terrain.height, terrain.tile),
            ],
        ));
    }

    for condition in data.win_conditions() {
        rows.push((
            DefinitionKind::WinCondition,
            [
                condition.name.clone(),
                DefinitionKind::WinCondition.to_string(),
                condition.rule.to_string(),
            ],
        ));
    }

    rows
}
