use std::collections::{BTreeMap, BTreeSet, HashMap};

use meridian_event::SimTime;

use crate::entity::{EntityId, EntityState, GameEntity};
use crate::state::PlayerId;

/// The entity arena. Owns every live entity in the universe.
///
/// Identifiers are allocated monotonically and never reused, so a stale
/// [`EntityId`] simply stops resolving once its entity is removed.
#[derive(Debug, Default)]
pub struct World {
    entities: BTreeMap<EntityId, GameEntity>,
    next_id: u64,

    // Indexes
    by_definition: HashMap<String, BTreeSet<EntityId>>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Entity CRUD
    // -----------------------------------------------------------------------

    /// Add an entity, assigning it a fresh id. The state's own id is overwritten.
    pub(crate) fn spawn(&mut self, mut state: EntityState) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        state.id = id;
        self.by_definition
            .entry(state.definition.clone())
            .or_default()
            .insert(id);
        self.entities.insert(id, GameEntity::new(state));
        id
    }

    /// Remove an entity. Dropping it releases its render connector.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<GameEntity> {
        let entity = self.entities.remove(&id)?;
        let definition = &entity.state().definition;
        if let Some(ids) = self.by_definition.get_mut(definition) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_definition.remove(definition);
            }
        }
        Some(entity)
    }

    /// Get an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&GameEntity> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut GameEntity> {
        self.entities.get_mut(&id)
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    /// All live entities, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GameEntity> {
        self.entities.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameEntity> {
        self.entities.values_mut()
    }

    /// Ids of live entities built from `definition` (exact match).
    pub fn of_definition(&self, definition: &str) -> Vec<EntityId> {
        self.by_definition
            .get(definition)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ids of entities that have expired at `now`.
    pub fn expired(&self, now: SimTime) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.state().is_expired(now))
            .map(GameEntity::id)
            .collect()
    }

    /// Live entity count per owning player. Neutral entities are not counted.
    pub fn live_by_owner(&self) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for owner in self.entities.values().filter_map(|e| e.state().owner) {
            *counts.entry(owner).or_insert(0) += 1;
        }
        counts
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities that currently hold a render connector.
    pub fn connector_count(&self) -> usize {
        self.entities.values().filter(|e| e.has_connector()).count()
    }
}
