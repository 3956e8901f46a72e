use tracing::{debug, warn};

use crate::infra::Position;
use crate::protocol::MoveRequest;
use crate::state::{Grid, PlayerState};

/// Everything the bot knows about the running game.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub player_id: Option<i32>,
    pub round: u32,
    pub grid: Option<Grid>,
    pub player: Option<PlayerState>,
    pub enemy: Option<PlayerState>,
    pub flag_position: Position,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_player_id(&mut self, player_id: i32) {
        self.player_id = Some(player_id);
    }

    /// Merge a move request. Returns false when the snapshot carries no
    /// record for this player and there is nothing to decide on.
    pub fn update(&mut self, request: &MoveRequest) -> bool {
        let Some(player_id) = self.player_id else {
            warn!("Move request before the server assigned a player id");
            return false;
        };
        let Some(own) = request.players.iter().find(|p| p.id == player_id) else {
            warn!("No record for player {} in move request", player_id);
            return false;
        };

        self.flag_position = request.flag.into();

        let grid = self
            .grid
            .get_or_insert_with(|| Grid::new(request.map.width, request.map.height));
        grid.update(&request.map);

        let flag_position = self.flag_position;
        match self.player.as_mut() {
            Some(player) => player.update(own),
            None => self.player = Some(PlayerState::new(own, flag_position)),
        }
        let Some(player) = self.player.as_mut() else {
            return false;
        };
        player.flag_position = flag_position;
        if player.is_round_start() {
            self.round += 1;
        }

        // Only one opponent is modelled
        let enemy_record = request.players.iter().find(|p| p.id != player_id);
        if let Some(record) = enemy_record {
            match self.enemy.as_mut() {
                Some(enemy) if enemy.id == record.id => enemy.update(record),
                _ => {
                    debug!("Opponent {} ({}) sighted", record.name, record.id);
                    self.enemy = Some(PlayerState::new(record, flag_position));
                }
            }
        }

        let player_view = player.position;
        let player_range = player.view_range;
        if let Some(enemy) = &mut self.enemy {
            enemy.flag_position = flag_position;
            enemy.visible = enemy_record.is_some()
                && player_view.chebyshev(&enemy.position) <= player_range;
            player.visible = enemy.is_alive && enemy.sees(&player_view);
        } else {
            player.visible = false;
        }

        true
    }

    /// Forget the finished game; the player id stays valid for the connection.
    pub fn reset_for_new_game(&mut self) {
        let player_id = self.player_id;
        *self = Self::default();
        self.player_id = player_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MapRecord, PlayerRecord, Point};
    use crate::state::Terrain;

    fn record(id: i32, x: i32, y: i32) -> PlayerRecord {
        PlayerRecord {
            id,
            name: format!("player{}", id),
            is_alive: true,
            has_flag: false,
            base_position: Point { x, y },
            view_range: 3,
            max_moves_per_round: 5.0,
            moves_left: 5.0,
            x,
            y,
        }
    }

    fn request(players: Vec<PlayerRecord>, fields: Vec<Vec<i32>>) -> MoveRequest {
        MoveRequest {
            map: MapRecord {
                width: 6,
                height: 2,
                fields,
            },
            players,
            flag: Point { x: 5, y: 1 },
        }
    }

    #[test]
    fn test_update_requires_player_id() {
        let mut world = WorldState::new();
        let req = request(vec![record(1, 0, 0)], vec![vec![1; 6]; 2]);

        assert!(!world.update(&req));
        assert!(world.grid.is_none());

        world.set_player_id(1);
        assert!(world.update(&req));
        assert_eq!(world.round, 1);
        assert_eq!(world.flag_position, Position::new(5, 1));
    }

    #[test]
    fn test_update_merges_map_and_tracks_enemy() {
        let mut world = WorldState::new();
        world.set_player_id(1);

        let first = request(
            vec![record(1, 0, 0), record(2, 2, 0)],
            vec![vec![1, 2, -1, -1, -1, -1], vec![-1; 6]],
        );
        assert!(world.update(&first));

        let enemy = world.enemy.as_ref().unwrap();
        assert!(enemy.visible);
        assert!(world.player.as_ref().unwrap().visible);
        assert_eq!(enemy.flag_position, Position::new(5, 1));

        // Enemy walks out of view and the map goes dark
        let mut far = record(2, 5, 0);
        far.moves_left = 2.0;
        let second = request(vec![record(1, 0, 0), far], vec![vec![-1; 6]; 2]);
        assert!(world.update(&second));

        let enemy = world.enemy.as_ref().unwrap();
        assert!(!enemy.visible);
        assert_eq!(enemy.position, Position::new(5, 0));
        assert!(!world.player.as_ref().unwrap().visible);

        let grid = world.grid.as_ref().unwrap();
        assert_eq!(grid.terrain(&Position::new(1, 0)), Terrain::Water);

        // Enemy record missing entirely
        let third = request(vec![record(1, 0, 0)], vec![vec![-1; 6]; 2]);
        assert!(world.update(&third));
        assert!(!world.enemy.as_ref().unwrap().visible);
    }

    #[test]
    fn test_reset_keeps_player_id() {
        let mut world = WorldState::new();
        world.set_player_id(3);
        world.update(&request(vec![record(3, 1, 1)], vec![vec![1; 6]; 2]));

        world.reset_for_new_game();
        assert_eq!(world.player_id, Some(3));
        assert!(world.grid.is_none());
        assert!(world.player.is_none());
        assert_eq!(world.round, 0);
    }
}
