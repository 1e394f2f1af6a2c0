//! Game-session orchestration for Meridian.
//!
//! A [`Game`] owns one session: the loaded [`meridian_data::DataStore`], the
//! session-wide [`GameState`], and the [`Universe`] holding every live entity.
//! The universe is driven exclusively by a shared
//! [`meridian_event::EventLoop`]; outside callers only ever read game state.
//!
//! Ownership is strictly single-parent:
//!
//! ```text
//! Game ─┬─ DataStore (shared read-only with Universe)
//!       ├─ GameState (read by StateHandle, written by Universe)
//!       └─ Universe ─┬─ World ── GameEntity (by EntityId)
//!                    └─ Terrain
//! ```
//!
//! Rendering is optional. A [`RenderFactory`] attached through
//! [`Game::attach_renderer`] builds one [`RenderConnector`] per entity.

/// Entity records stored in the world arena.
pub mod entity;
/// Error types for session construction.
pub mod error;
/// The session orchestration root.
pub mod game;
/// Presentation capability injected into the universe.
pub mod render;
/// Win-condition evaluation.
pub mod rules;
/// Session settings derived from game data.
pub mod settings;
/// Session-wide state and its read-only handle.
pub mod state;
/// The terrain grid.
pub mod terrain;
/// The event-driven container of world and terrain.
pub mod universe;
/// The entity arena.
pub mod world;

/// Re-exports of entity types.
pub use entity::{EntityId, EntityState, GameEntity};
/// Re-exports of error types.
pub use error::{ConstructionError, GameError, GameResult};
/// Re-export of [`game::Game`].
pub use game::Game;
/// Re-exports of render types.
pub use render::{RenderAttachment, RenderConnector, RenderFactory};
/// Re-export of [`settings::SessionSettings`].
pub use settings::SessionSettings;
/// Re-exports of state types.
pub use state::{
    ConditionStatus, GameState, Outcome, Player, PlayerId, PlayerStatus, SessionId, Side,
    StateHandle, WinCondition,
};
/// Re-export of [`terrain::Terrain`].
pub use terrain::Terrain;
/// Re-exports of [`universe::Universe`] and the event kinds it handles.
pub use universe::{SPAWN_EVENT, UPDATE_EVENT, Universe};
/// Re-export of [`world::World`].
pub use world::World;
