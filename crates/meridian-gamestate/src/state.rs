use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use meridian_data::{DataStore, WinRule};
use meridian_event::SimTime;
use uuid::Uuid;

use crate::error::ConstructionError;
use crate::settings::SessionSettings;

/// Unique identifier for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a player in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// The id of the player at `index` in definition order.
    pub fn from_index(index: usize) -> Result<Self, ConstructionError> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| ConstructionError::TooManyPlayers(index))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Where a player stands in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// The session is still running.
    Playing,
    /// The player is among the winners.
    Won,
    /// The session ended without this player winning.
    Lost,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "playing"),
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
        }
    }
}

/// A group of players that wins or loses together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// Every player with this team number.
    Team(u32),
    /// A player without a team.
    Solo(PlayerId),
}

/// A participating player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Player name from the definition.
    pub name: String,
    /// Team number, if any.
    pub team: Option<u32>,
    /// Current standing.
    pub status: PlayerStatus,
    /// Live entities owned at the last update.
    pub live_units: usize,
}

impl Player {
    /// The side this player belongs to.
    pub fn side(&self) -> Side {
        match self.team {
            Some(team) => Side::Team(team),
            None => Side::Solo(self.id),
        }
    }
}

/// Whether a win condition has been met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Not yet met.
    Pending,
    /// Met at the given time.
    Met {
        /// When the condition was met.
        at: SimTime,
    },
}

/// A win condition tracked by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinCondition {
    /// Condition name from the definition.
    pub name: String,
    /// The rule deciding when it is met.
    pub rule: WinRule,
    /// Current status.
    pub status: ConditionStatus,
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Name of the condition that was met.
    pub condition: String,
    /// When it was met.
    pub time: SimTime,
    /// Winning players. Empty when nobody survived.
    pub winners: Vec<PlayerId>,
}

/// Session-wide state that is not local to any entity.
///
/// Only the universe writes to it, and only while handling a dispatched
/// event. Everyone else reads through a [`StateHandle`].
#[derive(Debug, Clone)]
pub struct GameState {
    session: SessionId,
    started_at: DateTime<Utc>,
    settings: SessionSettings,
    players: Vec<Player>,
    conditions: Vec<WinCondition>,
    outcome: Option<Outcome>,
    last_update: Option<SimTime>,
    updates: u64,
}

impl GameState {
    /// Build the initial state from loaded definitions.
    pub fn from_data(data: &DataStore) -> Result<Self, ConstructionError> {
        let settings = SessionSettings::from_def(data.settings())?;

        let players = data
            .players()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(Player {
                    id: PlayerId::from_index(i)?,
                    name: p.name.clone(),
                    team: p.team,
                    status: PlayerStatus::Playing,
                    live_units: 0,
                })
            })
            .collect::<Result<Vec<_>, ConstructionError>>()?;

        if data.win_conditions().is_empty() {
            return Err(ConstructionError::NoWinCondition);
        }
        let sides: BTreeSet<Side> = players.iter().map(Player::side).collect();
        let mut conditions = Vec::with_capacity(data.win_conditions().len());
        for def in data.win_conditions() {
            match &def.rule {
                WinRule::DestroyUnit { unit } if data.unit(unit).is_none() => {
                    return Err(ConstructionError::UnknownUnit {
                        context: format!("win condition \"{}\"", def.name),
                        unit: unit.clone(),
                    });
                }
                WinRule::LastPlayerStanding if sides.len() < 2 => {
                    return Err(ConstructionError::NotEnoughSides(def.name.clone()));
                }
                _ => {}
            }
            conditions.push(WinCondition {
                name: def.name.clone(),
                rule: def.rule.clone(),
                status: ConditionStatus::Pending,
            });
        }

        Ok(Self {
            session: SessionId::new(),
            started_at: Utc::now(),
            settings,
            players,
            conditions,
            outcome: None,
            last_update: None,
            updates: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The session id.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Wall-clock time the session was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Effective session settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// All players, in definition order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0 as usize)
    }

    /// Find a player by name.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// All win conditions, in definition order.
    pub fn conditions(&self) -> &[WinCondition] {
        &self.conditions
    }

    /// The outcome, once a condition has been met.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Whether the session has ended.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Simulation time of the last universe update.
    pub fn last_update(&self) -> Option<SimTime> {
        self.last_update
    }

    /// Number of universe updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    // -----------------------------------------------------------------------
    // Mutation (universe only)
    // -----------------------------------------------------------------------

    pub(crate) fn record_update(&mut self, now: SimTime, live: &BTreeMap<PlayerId, usize>) {
        for player in &mut self.players {
            player.live_units = live.get(&player.id).copied().unwrap_or(0);
        }
        self.last_update = Some(now);
        self.updates += 1;
    }

    pub(crate) fn conclude(&mut self, index: usize, outcome: Outcome) {
        if let Some(condition) = self.conditions.get_mut(index) {
            condition.status = ConditionStatus::Met { at: outcome.time };
        }
        for player in &mut self.players {
            player.status = if outcome.winners.contains(&player.id) {
                PlayerStatus::Won
            } else {
                PlayerStatus::Lost
            };
        }
        self.outcome = Some(outcome);
    }
}

/// Shared, read-only access to a session's [`GameState`].
///
/// Cloning is cheap. A handle keeps the state alive after its game is
/// dropped; the state is then frozen.
#[derive(Debug, Clone)]
pub struct StateHandle(Rc<RefCell<GameState>>);

impl StateHandle {
    pub(crate) fn new(state: Rc<RefCell<GameState>>) -> Self {
        Self(state)
    }

    /// Borrow the state for reading.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a render connector while the universe
    /// is writing the state. Use [`StateHandle::try_read`] there.
    pub fn read(&self) -> Ref<'_, GameState> {
        self.0.borrow()
    }

    /// Borrow the state for reading, or `None` while it is being written.
    pub fn try_read(&self) -> Option<Ref<'_, GameState>> {
        self.0.try_borrow().ok()
    }

    /// Whether both handles refer to the same session state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use meridian_data::{Definition, PlayerDef, UnitDef, WinConditionDef};

    use super::*;

    fn player(name: &str, team: Option<u32>) -> Definition {
        Definition::Player(PlayerDef {
            name: name.to_string(),
            team,
        })
    }

    fn condition(name: &str, rule: WinRule) -> Definition {
        Definition::WinCondition(WinConditionDef {
            name: name.to_string(),
            rule,
        })
    }

    fn state(defs: Vec<Definition>) -> Result<GameState, ConstructionError> {
        GameState::from_data(&DataStore::from_definitions(defs).unwrap())
    }

    #[test]
    fn initial_state_from_definitions() {
        let state = state(vec![
            player("red", None),
            player("blue", None),
            condition("wonder", WinRule::SurviveUntil { time: 100 }),
        ])
        .unwrap();

        assert_eq!(state.players().len(), 2);
        assert_eq!(state.player(PlayerId(1)).unwrap().name, "blue");
        assert_eq!(state.player_by_name("red").unwrap().id, PlayerId(0));
        assert_eq!(state.conditions()[0].status, ConditionStatus::Pending);
        assert!(!state.is_over());
        assert_eq!(state.updates(), 0);
        assert_eq!(state.settings(), &SessionSettings::default());
    }

    #[test]
    fn win_condition_required() {
        let err = state(vec![player("red", None)]).unwrap_err();
        assert!(matches!(err, ConstructionError::NoWinCondition));
    }

    #[test]
    fn destroy_unit_must_name_a_unit() {
        let err = state(vec![condition(
            "regicide",
            WinRule::DestroyUnit {
                unit: "king".into(),
            },
        )])
        .unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownUnit { ref unit, .. } if unit == "king"));

        let ok = state(vec![
            Definition::Unit(UnitDef {
                name: "king".into(),
                hit_points: Some(1),
                ..Default::default()
            }),
            condition(
                "regicide",
                WinRule::DestroyUnit {
                    unit: "king".into(),
                },
            ),
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn last_player_standing_needs_two_sides() {
        let err = state(vec![
            player("red", Some(1)),
            player("blue", Some(1)),
            condition("conquest", WinRule::LastPlayerStanding),
        ])
        .unwrap_err();
        assert!(matches!(err, ConstructionError::NotEnoughSides(_)));

        let ok = state(vec![
            player("red", Some(1)),
            player("blue", None),
            condition("conquest", WinRule::LastPlayerStanding),
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn conclude_sets_player_statuses() {
        let mut state = state(vec![
            player("red", None),
            player("blue", None),
            condition("wonder", WinRule::SurviveUntil { time: 10 }),
        ])
        .unwrap();

        let live = BTreeMap::from([(PlayerId(0), 3)]);
        state.record_update(SimTime(10), &live);
        state.conclude(
            0,
            Outcome {
                condition: "wonder".into(),
                time: SimTime(10),
                winners: vec![PlayerId(0)],
            },
        );

        assert!(state.is_over());
        assert_eq!(state.players()[0].status, PlayerStatus::Won);
        assert_eq!(state.players()[0].live_units, 3);
        assert_eq!(state.players()[1].status, PlayerStatus::Lost);
        assert_eq!(state.players()[1].live_units, 0);
        assert_eq!(
            state.conditions()[0].status,
            ConditionStatus::Met { at: SimTime(10) }
        );
        assert_eq!(state.last_update(), Some(SimTime(10)));
    }

    #[test]
    fn player_ids_follow_definition_order() {
        assert_eq!(PlayerId::from_index(0).unwrap(), PlayerId(0));
        assert_eq!(
            PlayerId::from_index(u32::MAX as usize).unwrap(),
            PlayerId(u32::MAX)
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn player_index_beyond_u32_rejected() {
        let index = u32::MAX as usize + 1;
        let err = PlayerId::from_index(index).unwrap_err();
        assert!(matches!(err, ConstructionError::TooManyPlayers(i) if i == index));
    }

    #[test]
    fn handles_share_state() {
        let shared = Rc::new(RefCell::new(
            state(vec![condition("wonder", WinRule::SurviveUntil { time: 1 })]).unwrap(),
        ));
        let a = StateHandle::new(Rc::clone(&shared));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.read().session_id(), b.read().session_id());

        let _writer = shared.borrow_mut();
        assert!(a.try_read().is_none());
    }
}
