use tracing::{debug, info, warn};

use crate::infra::GameObserver;
use crate::planners::Tactic;
use crate::protocol::{Direction, PlayerRecord};
use crate::state::WorldState;

pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_connected(&mut self, player_id: i32) {
        info!("Connected as player {}", player_id);
    }

    fn on_state_update(&mut self, world: &WorldState) {
        let Some(player) = &world.player else {
            return;
        };
        info!(
            "round: {}, pos: ({}, {}), moves left: {}, flag: {}",
            world.round,
            player.position.x,
            player.position.y,
            player.moves_left,
            if player.has_flag { "carried" } else { "free" },
        );

        if let Some(grid) = &world.grid {
            debug!("- known cells: {}/{}", grid.known_cells(), grid.width() * grid.height());
        }
        if let Some(enemy) = world.enemy.as_ref().filter(|e| e.visible) {
            info!(
                "- enemy {} at ({}, {}), alive: {}",
                enemy.name, enemy.position.x, enemy.position.y, enemy.is_alive
            );
        }
    }

    fn on_tactic_selected(&mut self, tactic: &Tactic, _world: &WorldState) {
        info!("Selected tactic: {:?}", tactic);
    }

    fn on_action_selected(&mut self, direction: Direction, _world: &WorldState) {
        info!("action: {}", direction.as_str_name());
    }

    fn on_server_error(&mut self, message: &str) {
        warn!("Server error: {}", message);
    }

    fn on_game_finished(&mut self, winner: Option<&PlayerRecord>, world: &WorldState) {
        match winner {
            Some(winner) if Some(winner.id) == world.player_id => info!("Game over, we won"),
            Some(winner) => info!("Game over, winner: {} ({})", winner.name, winner.id),
            None => info!("Game over"),
        }
        info!("Rounds played: {}", world.round);
    }
}
