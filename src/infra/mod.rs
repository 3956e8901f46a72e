mod connection;
mod default_observer;
mod error;
mod game_observer;
mod pathfinding;
mod plan;
mod types;

pub use connection::{GameConnection, ReplayFile};
pub use default_observer::DefaultObserver;
pub use error::{ConnectionError, PathError};
pub use game_observer::GameObserver;
pub use pathfinding::{
    ACCURATE_WEIGHT, GREEDY_DISTANCE_THRESHOLD, GREEDY_WEIGHT, Pathfinder, SearchMode,
};
pub use plan::{Plan, PlanStatus};
pub use types::{Bounds, Cell, Position};

use crate::protocol::Direction;

// ============================================================================
// Helper functions
// ============================================================================

/// Direction of a single step. Horizontal movement wins when both axes differ.
pub fn step_direction(from: Position, to: Position) -> Direction {
    if to.x > from.x {
        Direction::Right
    } else if to.x < from.x {
        Direction::Left
    } else if to.y > from.y {
        Direction::Down
    } else if to.y < from.y {
        Direction::Up
    } else {
        Direction::NoMove
    }
}
