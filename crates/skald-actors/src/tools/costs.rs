//! Default time costs, in ticks, for each tool.
//!
//! The cost is added to the current tick to give the actor's next
//! `next_available_tick` after a successful action. Costs can be overridden
//! per tool from the `tools.time_costs` configuration section.
//!
//! - Move, Reflect: 5
//! - Equip, Unequip: 2
//! - Attack: 3
//! - Wait, Rest: 1 per requested tick
//! - `ToggleStarvation`: 0
//! - Everything else: 1

use super::ToolKind;

/// Default cost of one use of `kind`.
///
/// For [`ToolKind::is_timed`] tools this is the cost per requested tick.
pub const fn default_time_cost(kind: ToolKind) -> u64 {
    match kind {
        ToolKind::Move | ToolKind::Reflect => 5,
        ToolKind::Equip | ToolKind::Unequip => 2,
        ToolKind::Attack => 3,
        ToolKind::ToggleStarvation => 0,
        ToolKind::Look
        | ToolKind::Grab
        | ToolKind::Drop
        | ToolKind::Give
        | ToolKind::Talk
        | ToolKind::TalkLoud
        | ToolKind::Scream
        | ToolKind::Eat
        | ToolKind::Open
        | ToolKind::Close
        | ToolKind::Wait
        | ToolKind::Rest
        | ToolKind::Interject
        | ToolKind::LeaveConversation
        | ToolKind::Inventory
        | ToolKind::Stats
        | ToolKind::Analyze
        | ToolKind::Reason => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_slower_than_walking() {
        let walk = default_time_cost(ToolKind::Move);
        assert!(ToolKind::ALL.iter().all(|kind| default_time_cost(*kind) <= walk));
    }

    #[test]
    fn reflecting_takes_longer_than_reasoning() {
        assert_eq!(default_time_cost(ToolKind::Reason), 1);
        assert_eq!(default_time_cost(ToolKind::Reflect), 5);
    }

    #[test]
    fn game_master_toggle_is_free() {
        assert_eq!(default_time_cost(ToolKind::ToggleStarvation), 0);
    }
}
