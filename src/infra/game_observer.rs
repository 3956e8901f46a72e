use crate::planners::Tactic;
use crate::protocol::{Direction, PlayerRecord};
use crate::state::WorldState;

/// Trait for observing game events during execution
pub trait GameObserver {
    /// Called when the server assigns our player id
    fn on_connected(&mut self, player_id: i32);

    /// Called after a move request has been merged into the world
    fn on_state_update(&mut self, world: &WorldState);

    /// Called when the tactic for this move is known
    fn on_tactic_selected(&mut self, tactic: &Tactic, world: &WorldState);

    /// Called when a move is selected
    fn on_action_selected(&mut self, direction: Direction, world: &WorldState);

    /// Called when the server reports a problem with one of our messages
    fn on_server_error(&mut self, _message: &str) {}

    /// Called when the game finishes
    fn on_game_finished(&mut self, winner: Option<&PlayerRecord>, world: &WorldState);
}
