//! Per-tick world snapshots.

use skald_types::{ActorSnapshot, ConnectionSnapshot, WorldSnapshot};
use skald_world::World;

use crate::conversation::ConversationBoard;

/// Project the world and live conversations at the end of `tick`.
///
/// Actors appear in creation order, connections and conversations in key
/// order, so identical states serialise identically.
pub fn capture(world: &World, board: &ConversationBoard, tick: u64) -> WorldSnapshot {
    let actors = world
        .actors()
        .map(|actor| ActorSnapshot {
            id: actor.id.clone(),
            name: actor.name.clone(),
            is_player: actor.is_player,
            location: actor.location.clone(),
            hp: actor.hp,
            hunger_stage: actor.hunger_stage,
            alive: actor.alive,
            next_available_tick: actor.next_available_tick,
        })
        .collect();

    let connections = world
        .locations()
        .map(|location| {
            let exits = location
                .connections()
                .iter()
                .map(|(to, status)| ConnectionSnapshot {
                    to: to.clone(),
                    status: *status,
                })
                .collect();
            (location.id().clone(), exits)
        })
        .collect();

    WorldSnapshot {
        tick,
        actors,
        connections,
        conversations: board.snapshots(),
    }
}
