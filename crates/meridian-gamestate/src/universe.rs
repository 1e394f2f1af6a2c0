use std::cell::RefCell;
use std::rc::{Rc, Weak};

use meridian_data::{DataStore, ResolvedUnit, TerrainDef};
use meridian_event::{Event, EventContext, EventError, EventResult, EventTarget, SimTime, TargetId};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::entity::{EntityId, EntityState};
use crate::error::ConstructionError;
use crate::render::RenderAttachment;
use crate::rules;
use crate::state::{GameState, PlayerId};
use crate::terrain::Terrain;
use crate::world::World;

/// Event kind that advances the universe by one update.
pub const UPDATE_EVENT: &str = "update";
/// Event kind that instantiates the unit named in the payload.
pub const SPAWN_EVENT: &str = "spawn";

/// Owns the world and terrain and reacts to events from the loop.
///
/// The universe is the only writer of [`GameState`]. It holds the state
/// weakly; the owning [`crate::Game`] keeps it alive.
pub struct Universe {
    data: Rc<DataStore>,
    state: Weak<RefCell<GameState>>,
    world: World,
    terrain: Terrain,
    rng: StdRng,
    attachment: RenderAttachment,
    render_generation: u64,
    target: Option<TargetId>,
    update_interval: u64,
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("entities", &self.world.len())
            .field("terrain", &self.terrain.name())
            .field("attachment", &self.attachment)
            .field("render_generation", &self.render_generation)
            .field("target", &self.target)
            .finish()
    }
}

impl Universe {
    /// Build the terrain and instantiate every non-abstract unit at `now`.
    ///
    /// Nothing is registered anywhere; on error the universe is simply dropped.
    pub(crate) fn new(
        data: Rc<DataStore>,
        state: &Rc<RefCell<GameState>>,
        now: SimTime,
    ) -> Result<Self, ConstructionError> {
        let default_terrain = TerrainDef::default();
        let terrain = Terrain::from_def(data.terrain().unwrap_or(&default_terrain))?;
        let (seed, update_interval) = {
            let state = state.borrow();
            (state.settings().seed, state.settings().update_interval)
        };

        let mut universe = Self {
            data: Rc::clone(&data),
            state: Rc::downgrade(state),
            world: World::new(),
            terrain,
            rng: StdRng::seed_from_u64(seed),
            attachment: RenderAttachment::Headless,
            render_generation: 0,
            target: None,
            update_interval,
        };

        let state = state.borrow();
        for unit in data.instantiable_units() {
            let (hit_points, owner) = universe.blueprint(unit, &state)?;
            for _ in 0..unit.count {
                universe.spawn(unit, hit_points, owner, now);
            }
        }
        tracing::debug!(
            entities = universe.world.len(),
            terrain = %universe.terrain.name(),
            "universe populated"
        );
        Ok(universe)
    }

    pub(crate) fn bind(&mut self, target: TargetId) {
        self.target = Some(target);
    }

    // -----------------------------------------------------------------------
    // Instantiation
    // -----------------------------------------------------------------------

    /// Validate a unit for instantiation: hit points, owner and position.
    fn blueprint(
        &self,
        unit: &ResolvedUnit,
        state: &GameState,
    ) -> Result<(u32, Option<PlayerId>), ConstructionError> {
        if unit.is_abstract {
            return Err(ConstructionError::AbstractUnit(unit.name.clone()));
        }
        let hit_points = unit
            .hit_points
            .ok_or_else(|| ConstructionError::MissingHitPoints(unit.name.clone()))?;
        let owner = match &unit.owner {
            Some(name) => Some(
                state
                    .player_by_name(name)
                    .map(|p| p.id)
                    .ok_or_else(|| ConstructionError::UnknownOwner {
                        unit: unit.name.clone(),
                        owner: name.clone(),
                    })?,
            ),
            None => None,
        };
        if let Some(position) = unit.position {
            if !self.terrain.contains(position) {
                return Err(ConstructionError::OutOfBounds {
                    unit: unit.name.clone(),
                    position,
                    width: self.terrain.width(),
                    height: self.terrain.height(),
                });
            }
        }
        Ok((hit_points, owner))
    }

    fn spawn(
        &mut self,
        unit: &ResolvedUnit,
        hit_points: u32,
        owner: Option<PlayerId>,
        now: SimTime,
    ) -> EntityId {
        let position = unit
            .position
            .unwrap_or_else(|| self.terrain.random_pos(&mut self.rng));
        let id = self.world.spawn(EntityState {
            id: EntityId(0),
            definition: unit.name.clone(),
            owner,
            position,
            hit_points,
            spawned_at: now,
            expires_at: unit.lifespan.map(|l| now + l),
            tags: unit.tags.clone(),
        });

        if let Some(entity) = self.world.get_mut(id) {
            if let Some(connector) = self.attachment.build(entity.state()) {
                entity.set_connector(self.render_generation, connector);
            }
        }
        tracing::trace!(entity = %id, unit = %unit.name, %position, "spawned");
        id
    }

    fn spawn_named(&mut self, name: &str, now: SimTime) -> Result<EntityId, String> {
        let data = Rc::clone(&self.data);
        let unit = data.unit(name).ok_or_else(|| {
            ConstructionError::UnknownUnit {
                context: "spawn event".into(),
                unit: name.to_string(),
            }
            .to_string()
        })?;
        let state = self
            .state
            .upgrade()
            .ok_or_else(|| "game state is gone".to_string())?;
        let (hit_points, owner) = {
            let state = state
                .try_borrow()
                .map_err(|_| "game state is being written".to_string())?;
            self.blueprint(unit, &state).map_err(|e| e.to_string())?
        };
        Ok(self.spawn(unit, hit_points, owner, now))
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Swap the render attachment. Returns `false` if it was already active.
    ///
    /// Every connector built under the previous attachment is dropped before
    /// any new one is built.
    pub(crate) fn attach_renderer(&mut self, attachment: RenderAttachment) -> bool {
        if self.attachment.same_as(&attachment) {
            tracing::debug!(attachment = ?attachment, "render attachment unchanged");
            return false;
        }

        for entity in self.world.iter_mut() {
            entity.clear_connector();
        }
        self.attachment = attachment;
        self.render_generation += 1;

        let generation = self.render_generation;
        let attachment = &self.attachment;
        for entity in self.world.iter_mut() {
            if let Some(connector) = attachment.build(entity.state()) {
                entity.set_connector(generation, connector);
            }
        }
        tracing::info!(
            attachment = ?self.attachment,
            generation,
            connectors = self.world.connector_count(),
            "render attachment changed"
        );
        true
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Advance to `now`: expire entities and evaluate win conditions, then
    /// present to connectors. Returns whether the session is still running.
    ///
    /// Fails without touching anything while a reader holds the state.
    fn update(&mut self, now: SimTime) -> Result<bool, String> {
        let Some(state) = self.state.upgrade() else {
            tracing::warn!("game state dropped; stopping updates");
            return Ok(false);
        };
        // Nothing is touched until the state is writable
        let mut state = state
            .try_borrow_mut()
            .map_err(|_| "game state is borrowed by a reader".to_string())?;

        for id in self.world.expired(now) {
            if let Some(entity) = self.world.remove(id) {
                tracing::debug!(entity = %id, unit = %entity.state().definition, "lifespan ended");
            }
        }
        state.record_update(now, &self.world.live_by_owner());
        if let Some((index, outcome)) = rules::evaluate(&state, &self.world, &self.data, now) {
            tracing::info!(
                condition = %outcome.condition,
                time = %outcome.time,
                winners = outcome.winners.len(),
                "win condition met"
            );
            state.conclude(index, outcome);
        }
        let running = !state.is_over();
        drop(state);

        // Connectors may read the state through a handle
        for entity in self.world.iter_mut() {
            entity.present();
        }
        Ok(running)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The entity arena.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The terrain grid.
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// The active render attachment.
    pub fn render_attachment(&self) -> &RenderAttachment {
        &self.attachment
    }

    /// Incremented on every effective attachment change.
    pub fn render_generation(&self) -> u64 {
        self.render_generation
    }

    /// The id under which the universe is registered with the event loop.
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    /// Simulation time between updates.
    pub fn update_interval(&self) -> u64 {
        self.update_interval
    }
}

fn handler_error(event: &Event, message: String) -> EventError {
    EventError::Handler {
        target: event.target,
        kind: event.kind.clone(),
        time: event.time,
        message,
    }
}

impl EventTarget for Universe {
    fn name(&self) -> &str {
        "universe"
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> EventResult<()> {
        match event.kind.as_str() {
            UPDATE_EVENT => {
                let running = match self.update(event.time) {
                    Ok(running) => running,
                    Err(message) => {
                        // Retry the same update on the next dispatch
                        ctx.schedule_at(event.time, ctx.target(), UPDATE_EVENT, None);
                        return Err(handler_error(event, message));
                    }
                };
                if running {
                    ctx.schedule_in(self.update_interval, UPDATE_EVENT, None);
                } else {
                    tracing::debug!(time = %event.time, "session over; no further updates");
                }
                Ok(())
            }
            SPAWN_EVENT => {
                let name = event
                    .payload
                    .as_deref()
                    .ok_or_else(|| handler_error(event, "spawn event without a unit".into()))?;
                let id = self
                    .spawn_named(name, event.time)
                    .map_err(|message| handler_error(event, message))?;
                tracing::debug!(entity = %id, unit = name, time = %event.time, "spawned by event");
                Ok(())
            }
            other => {
                tracing::warn!(kind = other, "ignoring unknown event kind");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use meridian_data::{Definition, PlayerDef, TilePos, UnitDef, WinConditionDef, WinRule};
    use meridian_event::EventLoop;

    use super::*;
    use crate::render::{RenderConnector, RenderFactory};

    fn unit(name: &str) -> UnitDef {
        UnitDef {
            name: name.to_string(),
            hit_points: Some(10),
            ..Default::default()
        }
    }

    fn defs(units: Vec<UnitDef>) -> Vec<Definition> {
        let mut defs = vec![
            Definition::Player(PlayerDef {
                name: "red".into(),
                team: None,
            }),
            Definition::WinCondition(WinConditionDef {
                name: "wonder".into(),
                rule: WinRule::SurviveUntil { time: 1000 },
            }),
        ];
        defs.extend(units.into_iter().map(Definition::Unit));
        defs
    }

    fn build(
        defs: Vec<Definition>,
    ) -> Result<(Rc<RefCell<GameState>>, Universe), ConstructionError> {
        let data = Rc::new(DataStore::from_definitions(defs).unwrap());
        let state = Rc::new(RefCell::new(GameState::from_data(&data)?));
        let universe = Universe::new(data, &state, SimTime::ZERO)?;
        Ok((state, universe))
    }

    #[test]
    fn instantiates_count_copies() {
        let mut villager = unit("villager");
        villager.count = Some(3);
        villager.owner = Some("red".into());
        let (_state, universe) = build(defs(vec![villager])).unwrap();
        assert_eq!(universe.world().len(), 3);
        assert!(
            universe
                .world()
                .iter()
                .all(|e| e.state().owner == Some(PlayerId(0)))
        );
    }

    #[test]
    fn placement_is_seeded() {
        let mut villager = unit("villager");
        villager.count = Some(5);
        let positions = |u: &Universe| -> Vec<TilePos> {
            u.world().iter().map(|e| e.state().position).collect()
        };
        let (_a, first) = build(defs(vec![villager.clone()])).unwrap();
        let (_b, second) = build(defs(vec![villager])).unwrap();
        assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn missing_hit_points_rejected() {
        let err = build(defs(vec![UnitDef {
            name: "ghost".into(),
            ..Default::default()
        }]))
        .unwrap_err();
        assert!(matches!(err, ConstructionError::MissingHitPoints(ref n) if n == "ghost"));
    }

    #[test]
    fn unknown_owner_rejected() {
        let mut villager = unit("villager");
        villager.owner = Some("purple".into());
        let err = build(defs(vec![villager])).unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownOwner { .. }));
    }

    #[test]
    fn position_outside_terrain_rejected() {
        let mut tower = unit("tower");
        tower.position = Some(TilePos::new(16, 0));
        let err = build(defs(vec![tower])).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::OutOfBounds {
                width: 16,
                height: 16,
                ..
            }
        ));
    }

    struct Counting(Rc<Cell<usize>>);

    impl RenderConnector for Counting {
        fn update(&mut self, _entity: &EntityState) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct CountingFactory(Rc<Cell<usize>>);

    impl RenderFactory for CountingFactory {
        fn name(&self) -> &str {
            "counting"
        }

        fn connector(&self, _entity: &EntityState) -> Box<dyn RenderConnector> {
            Box::new(Counting(Rc::clone(&self.0)))
        }
    }

    #[test]
    fn update_events_drive_the_universe() {
        let mut arrow = unit("arrow");
        arrow.lifespan = Some(15);
        let (state, universe) = build(defs(vec![arrow, unit("villager")])).unwrap();
        let universe = Rc::new(RefCell::new(universe));

        let presented = Rc::new(Cell::new(0));
        let factory: Rc<dyn RenderFactory> = Rc::new(CountingFactory(Rc::clone(&presented)));
        universe
            .borrow_mut()
            .attach_renderer(RenderAttachment::factory(factory));

        let mut event_loop = EventLoop::default();
        let target = event_loop.register(&universe);
        event_loop.schedule(SimTime::ZERO, target, UPDATE_EVENT, None);

        // Updates at t=0 and t=10 see both entities; t=20 only the villager
        event_loop.reach(SimTime(20)).unwrap();
        assert_eq!(universe.borrow().world().len(), 1);
        assert_eq!(presented.get(), 5);
        assert_eq!(state.borrow().updates(), 3);
        assert_eq!(event_loop.pending_for(target), 1);
    }

    #[test]
    fn spawn_event_adds_entity() {
        let (_state, universe) = build(defs(vec![unit("villager")])).unwrap();
        let universe = Rc::new(RefCell::new(universe));
        let mut event_loop = EventLoop::default();
        let target = event_loop.register(&universe);

        event_loop.schedule(SimTime(5), target, SPAWN_EVENT, Some("villager".into()));
        event_loop.reach(SimTime(5)).unwrap();
        let universe = universe.borrow();
        assert_eq!(universe.world().len(), 2);
        assert!(
            universe
                .world()
                .iter()
                .any(|e| e.state().spawned_at == SimTime(5))
        );
    }

    #[test]
    fn spawn_of_unknown_unit_fails_the_handler() {
        let (_state, universe) = build(defs(vec![])).unwrap();
        let universe = Rc::new(RefCell::new(universe));
        let mut event_loop = EventLoop::default();
        let target = event_loop.register(&universe);

        event_loop.schedule(SimTime(1), target, SPAWN_EVENT, Some("dragon".into()));
        let err = event_loop.reach(SimTime(1)).unwrap_err();
        assert!(matches!(err, EventError::Handler { ref kind, .. } if kind == SPAWN_EVENT));
        assert!(universe.borrow().world().is_empty());
    }

    #[test]
    fn unknown_event_kinds_are_ignored() {
        let (_state, universe) = build(defs(vec![])).unwrap();
        let universe = Rc::new(RefCell::new(universe));
        let mut event_loop = EventLoop::default();
        let target = event_loop.register(&universe);
        event_loop.schedule(SimTime(1), target, "dance", None);
        assert_eq!(event_loop.reach(SimTime(1)).unwrap(), 1);
    }
}
