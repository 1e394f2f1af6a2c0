use std::fmt;

use meridian_data::TilePos;
use meridian_event::SimTime;

use crate::render::RenderConnector;
use crate::state::PlayerId;

/// Identifier of an entity within one universe. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The simulation-relevant fields of an entity.
///
/// This is what render connectors see; presentation never changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    /// Arena identifier.
    pub id: EntityId,
    /// Name of the unit definition the entity was built from.
    pub definition: String,
    /// Owning player, `None` for neutral entities.
    pub owner: Option<PlayerId>,
    /// Current tile.
    pub position: TilePos,
    /// Remaining hit points.
    pub hit_points: u32,
    /// When the entity entered the world.
    pub spawned_at: SimTime,
    /// When the entity leaves the world, if it is mortal.
    pub expires_at: Option<SimTime>,
    /// Tags copied from the definition.
    pub tags: Vec<String>,
}

impl EntityState {
    /// Whether the entity's lifespan has run out at `now`.
    pub fn is_expired(&self, now: SimTime) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

struct Presentation {
    generation: u64,
    connector: Box<dyn RenderConnector>,
}

/// An entity in the world arena: simulation state plus an optional connector.
pub struct GameEntity {
    state: EntityState,
    presentation: Option<Presentation>,
}

impl fmt::Debug for GameEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEntity")
            .field("state", &self.state)
            .field("render_generation", &self.render_generation())
            .finish()
    }
}

impl GameEntity {
    pub(crate) fn new(state: EntityState) -> Self {
        Self {
            state,
            presentation: None,
        }
    }

    /// The entity's simulation state.
    pub fn state(&self) -> &EntityState {
        &self.state
    }

    /// The entity's identifier.
    pub fn id(&self) -> EntityId {
        self.state.id
    }

    /// Whether a render connector is attached.
    pub fn has_connector(&self) -> bool {
        self.presentation.is_some()
    }

    /// Attachment generation the connector was built under, if any.
    pub fn render_generation(&self) -> Option<u64> {
        self.presentation.as_ref().map(|p| p.generation)
    }

    pub(crate) fn set_connector(&mut self, generation: u64, connector: Box<dyn RenderConnector>) {
        self.presentation = Some(Presentation {
            generation,
            connector,
        });
    }

    pub(crate) fn clear_connector(&mut self) {
        self.presentation = None;
    }

    /// Push the current state to the connector, if any.
    pub(crate) fn present(&mut self) {
        if let Some(p) = &mut self.presentation {
            p.connector.update(&self.state);
        }
    }
}
