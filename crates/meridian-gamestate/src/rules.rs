//! Each rule is checked in definition order after every universe update.
//! The first one met decides the [`Outcome`].

use std::collections::BTreeSet;

use meridian_data::{DataStore, WinRule};
use meridian_event::SimTime;

use crate::state::{GameState, Outcome, PlayerId, Side};
use crate::world::World;

/// Check every pending condition. Returns the index and outcome of the first
/// one that is met.
pub fn evaluate(
    state: &GameState,
    world: &World,
    data: &DataStore,
    now: SimTime,
) -> Option<(usize, Outcome)> {
    if state.is_over() {
        return None;
    }
    state
        .conditions()
        .iter()
        .enumerate()
        .find_map(|(index, condition)| {
            let winners = check(&condition.rule, state, world, data, now)?;
            Some((
                index,
                Outcome {
                    condition: condition.name.clone(),
                    time: now,
                    winners,
                },
            ))
        })
}

/// Winners if `rule` is met, `None` otherwise.
fn check(
    rule: &WinRule,
    state: &GameState,
    world: &World,
    data: &DataStore,
    now: SimTime,
) -> Option<Vec<PlayerId>> {
    match rule {
        WinRule::SurviveUntil { time } => (now.as_u64() >= *time).then(|| survivors(world)),
        WinRule::LastPlayerStanding => {
            let alive = survivors(world);
            let sides: BTreeSet<Side> = state
                .players()
                .iter()
                .filter(|p| alive.contains(&p.id))
                .map(|p| p.side())
                .collect();
            if sides.len() > 1 {
                return None;
            }
            Some(
                state
                    .players()
                    .iter()
                    .filter(|p| sides.contains(&p.side()))
                    .map(|p| p.id)
                    .collect(),
            )
        }
        WinRule::DestroyUnit { unit } => {
            let remaining = world.iter().any(|e| {
                data.unit(&e.state().definition)
                    .is_some_and(|def| def.is_a(unit))
            });
            (!remaining).then(|| survivors(world))
        }
    }
}

/// Players owning at least one live entity, in id order.
fn survivors(world: &World) -> Vec<PlayerId> {
    world.live_by_owner().into_keys().collect()
}
