pub mod game;
pub mod infra;
pub mod planners;
pub mod protocol;
pub mod state;

// Re-export commonly used types for convenience
pub use infra::{Pathfinder, Plan, Position, SearchMode};
pub use protocol::Direction;
pub use state::{Grid, WorldState};
