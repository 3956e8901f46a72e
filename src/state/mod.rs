mod grid;
mod player_state;
mod world_state;

pub use grid::{Grid, Terrain};
pub use player_state::{FLAG_CARRY_PENALTY, PlayerState};
pub use world_state::WorldState;
