use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;

use meridian_data::DataStore;
use meridian_event::{EventId, SharedEventLoop, SimTime, TargetId};

use crate::error::{ConstructionError, GameResult};
use crate::render::RenderAttachment;
use crate::state::{GameState, SessionId, StateHandle};
use crate::universe::{SPAWN_EVENT, UPDATE_EVENT, Universe};

/// One running game session.
///
/// A `Game` either exists fully constructed and bound to its event loop, or
/// not at all. After construction the universe only changes through events
/// dispatched by the loop; the game itself only forwards render attachment
/// and hands out read access.
pub struct Game {
    data: Rc<DataStore>,
    state: Rc<RefCell<GameState>>,
    universe: Rc<RefCell<Universe>>,
    event_loop: SharedEventLoop,
    target: TargetId,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("root", &self.data.root())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Load the game data under `root_dir` and start a session on `event_loop`.
    ///
    /// The first universe update is scheduled at the loop's current time.
    /// On error nothing is registered with or queued on the loop.
    pub fn new(root_dir: &Path, event_loop: SharedEventLoop) -> GameResult<Self> {
        let data = DataStore::load(root_dir)?;
        Self::from_store(data, event_loop)
    }

    /// Start a session from an already loaded store.
    pub fn from_store(data: DataStore, event_loop: SharedEventLoop) -> GameResult<Self> {
        let data = Rc::new(data);
        let state = Rc::new(RefCell::new(GameState::from_data(&data)?));

        let mut lp = event_loop
            .try_borrow_mut()
            .map_err(|_| ConstructionError::EventLoopBusy)?;
        let now = lp.now();
        let universe = Rc::new(RefCell::new(Universe::new(
            Rc::clone(&data),
            &state,
            now,
        )?));

        // Everything is built; bind to the loop last
        let target = lp.register(&universe);
        universe.borrow_mut().bind(target);
        lp.schedule(now, target, UPDATE_EVENT, None);
        drop(lp);

        {
            let state = state.borrow();
            tracing::info!(
                session = %state.session_id(),
                name = %state.settings().name,
                players = state.players().len(),
                entities = universe.borrow().world().len(),
                target = %target,
                "game session started"
            );
        }

        Ok(Self {
            data,
            state,
            universe,
            event_loop,
            target,
        })
    }

    /// Read-only access to the session state.
    pub fn state(&self) -> StateHandle {
        StateHandle::new(Rc::clone(&self.state))
    }

    /// Attach a render factory, or detach with [`RenderAttachment::Headless`].
    ///
    /// Attaching the active factory again does nothing. Simulation state is
    /// never touched.
    pub fn attach_renderer(&mut self, attachment: RenderAttachment) {
        self.universe.borrow_mut().attach_renderer(attachment);
    }

    /// Schedule a unit to be spawned at `time`. Returns `None` while the loop
    /// is dispatching.
    pub fn schedule_spawn(&self, time: SimTime, unit: &str) -> Option<EventId> {
        let mut lp = self.event_loop.try_borrow_mut().ok()?;
        Some(lp.schedule(time, self.target, SPAWN_EVENT, Some(unit.to_string())))
    }

    /// Read access to the universe.
    pub fn universe(&self) -> Ref<'_, Universe> {
        self.universe.borrow()
    }

    /// The loaded game data.
    pub fn data(&self) -> &DataStore {
        &self.data
    }

    /// The session id.
    pub fn session_id(&self) -> SessionId {
        self.state.borrow().session_id()
    }

    /// The active render attachment.
    pub fn render_attachment(&self) -> RenderAttachment {
        self.universe.borrow().render_attachment().clone()
    }

    /// The id under which the universe is registered.
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// The event loop driving this session.
    pub fn event_loop(&self) -> &SharedEventLoop {
        &self.event_loop
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        match self.event_loop.try_borrow_mut() {
            Ok(mut lp) => {
                let cancelled = lp.unregister(self.target);
                tracing::info!(target = %self.target, cancelled, "game session ended");
            }
            Err(_) => {
                // The loop prunes the dead weak target on its next dispatch
                tracing::warn!(target = %self.target, "event loop busy while ending session");
            }
        }
    }
}
