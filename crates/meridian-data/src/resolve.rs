use std::collections::{BTreeMap, HashMap};

use crate::definition::{MetadataValue, TilePos, UnitDef};
use crate::error::{DataLoadError, DataResult};

/// A unit definition with its parent chain folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUnit {
    /// Unit name.
    pub name: String,
    /// Ancestors, nearest parent last.
    pub ancestry: Vec<String>,
    /// Whether the unit is a prototype only. Never inherited.
    pub is_abstract: bool,
    /// Starting hit points, inherited when unset.
    pub hit_points: Option<u32>,
    /// Lifespan, inherited when unset.
    pub lifespan: Option<u64>,
    /// Instances created at session start. Never inherited.
    pub count: u32,
    /// Owning player name. Never inherited.
    pub owner: Option<String>,
    /// Fixed spawn position. Never inherited.
    pub position: Option<TilePos>,
    /// Parent tags followed by the unit's own, without duplicates.
    pub tags: Vec<String>,
    /// Parent properties overridden by the unit's own.
    pub properties: BTreeMap<String, MetadataValue>,
}

impl ResolvedUnit {
    fn inherit(def: &UnitDef, parent: Option<&ResolvedUnit>) -> Self {
        let mut ancestry = Vec::new();
        let mut tags = Vec::new();
        let mut properties = BTreeMap::new();
        let mut hit_points = def.hit_points;
        let mut lifespan = def.lifespan;

        if let Some(parent) = parent {
            ancestry.extend(parent.ancestry.iter().cloned());
            ancestry.push(parent.name.clone());
            tags.extend(parent.tags.iter().cloned());
            properties.extend(
                parent
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            hit_points = hit_points.or(parent.hit_points);
            lifespan = lifespan.or(parent.lifespan);
        }

        for tag in &def.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        properties.extend(def.properties.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            name: def.name.clone(),
            ancestry,
            is_abstract: def.is_abstract,
            hit_points,
            lifespan,
            count: def.count.unwrap_or(1),
            owner: def.owner.clone(),
            position: def.position,
            tags,
            properties,
        }
    }

    /// True if this unit is `name` or descends from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestry.iter().any(|a| a == name)
    }
}

/// Resolve every unit against its parent chain, preserving input order.
///
/// Names must already be unique.
pub fn resolve_units(defs: &[UnitDef]) -> DataResult<Vec<ResolvedUnit>> {
    let by_name: HashMap<&str, &UnitDef> = defs.iter().map(|d| (d.name.as_str(), d)).collect();
    let mut done: HashMap<String, ResolvedUnit> = HashMap::new();

    let mut resolved = Vec::with_capacity(defs.len());
    for def in defs {
        let mut stack = Vec::new();
        resolved.push(resolve_one(def, &by_name, &mut done, &mut stack)?);
    }
    Ok(resolved)
}

fn resolve_one(
    def: &UnitDef,
    by_name: &HashMap<&str, &UnitDef>,
    done: &mut HashMap<String, ResolvedUnit>,
    stack: &mut Vec<String>,
) -> DataResult<ResolvedUnit> {
    if let Some(unit) = done.get(&def.name) {
        return Ok(unit.clone());
    }
    if stack.contains(&def.name) {
        return Err(DataLoadError::InheritanceCycle(def.name.clone()));
    }

    let parent = match &def.parent {
        Some(parent_name) => {
            let parent_def =
                by_name
                    .get(parent_name.as_str())
                    .ok_or_else(|| DataLoadError::UnknownParent {
                        unit: def.name.clone(),
                        parent: parent_name.clone(),
                    })?;
            stack.push(def.name.clone());
            let parent = resolve_one(parent_def, by_name, done, stack)?;
            stack.pop();
            Some(parent)
        }
        None => None,
    };

    let unit = ResolvedUnit::inherit(def, parent.as_ref());
    done.insert(def.name.clone(), unit.clone());
    Ok(unit)
}
