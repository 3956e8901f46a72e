pub mod tactics;

pub use tactics::{MAX_COMPUTATION_RANGE, Tactic};

use tracing::{error, warn};

use crate::infra::{PathError, Pathfinder};
use crate::protocol::Direction;
use crate::state::WorldState;

/// Turns the current world into one move per request. A failed decision
/// never ends the session: it is logged and the player stays put.
#[derive(Default)]
pub struct Planner {
    pathfinder: Pathfinder,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(round = world.round))]
    pub fn decide_action(&mut self, world: &mut WorldState) -> (Tactic, Direction) {
        let (Some(grid), Some(player)) = (world.grid.as_ref(), world.player.as_mut()) else {
            warn!("No map or player yet, holding");
            return (Tactic::Hold, Direction::NoMove);
        };

        match tactics::decide(player, grid, &mut self.pathfinder, world.enemy.as_ref()) {
            Ok(decision) => decision,
            Err(err @ PathError::InternalInvariant(_)) => {
                error!("Decision aborted: {}", err);
                (Tactic::Hold, Direction::NoMove)
            }
            Err(err) => {
                warn!("Decision failed: {}", err);
                (Tactic::Hold, Direction::NoMove)
            }
        }
    }
}
