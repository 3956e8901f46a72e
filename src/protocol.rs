//! JSON messages exchanged with the game server.
//!
//! Every message is an object tagged by its `"type"` field; field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::infra::Position;

/// A single move, the only output of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    NoMove,
}

impl Direction {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::NoMove => "no_move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Position::new(point.x, point.y)
    }
}

/// Map as seen by a player this round. `fields[y][x]` holds a terrain code,
/// `-1` for cells outside the player's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub width: i32,
    pub height: i32,
    pub fields: Vec<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: i32,
    pub name: String,
    pub is_alive: bool,
    pub has_flag: bool,
    pub base_position: Point,
    pub view_range: i32,
    pub max_moves_per_round: f64,
    pub moves_left: f64,
    pub x: i32,
    pub y: i32,
}

impl PlayerRecord {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub map: MapRecord,
    pub players: Vec<PlayerRecord>,
    pub flag: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    Connected {
        #[serde(default)]
        msg: String,
        #[serde(rename = "playerId")]
        player_id: i32,
    },
    MoveRequest(MoveRequest),
    #[serde(rename = "ResponseOK")]
    ResponseOk {
        #[serde(default)]
        msg: String,
    },
    Error {
        #[serde(default)]
        msg: serde_json::Value,
    },
    GameOver {
        #[serde(default)]
        winner: Option<PlayerRecord>,
    },
    /// Messages meant for other clients (spectator front ends).
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    Connect {
        name: String,
    },
    Move {
        #[serde(rename = "playerId")]
        player_id: i32,
        #[serde(rename = "move")]
        direction: Direction,
    },
}
