use crate::infra::{Plan, Position};
use crate::protocol::PlayerRecord;
use crate::state::Grid;

/// Extra move points spent on every step taken while carrying the flag.
pub const FLAG_CARRY_PENALTY: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: i32,
    pub name: String,
    pub is_alive: bool,
    pub has_flag: bool,
    pub base_position: Position,
    pub position: Position,
    pub moves_left: f64,
    pub max_moves_per_round: f64,
    pub view_range: i32,
    /// Whether this player is currently in sight of the other one.
    pub visible: bool,
    pub flag_position: Position,
    plan: Plan,
}

impl PlayerState {
    pub fn new(record: &PlayerRecord, flag_position: Position) -> Self {
        let position = record.position();
        Self {
            id: record.id,
            name: record.name.clone(),
            is_alive: record.is_alive,
            has_flag: record.has_flag,
            base_position: record.base_position.into(),
            position,
            moves_left: record.moves_left,
            max_moves_per_round: record.max_moves_per_round,
            view_range: record.view_range,
            visible: true,
            flag_position,
            plan: Plan::empty(position),
        }
    }

    /// Overwrite the live fields from the latest snapshot. The cached plan is
    /// left alone.
    pub fn update(&mut self, record: &PlayerRecord) {
        self.is_alive = record.is_alive;
        self.has_flag = record.has_flag;
        self.position = record.position();
        self.moves_left = record.moves_left;
        self.max_moves_per_round = record.max_moves_per_round;
        self.view_range = record.view_range;
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut Plan {
        &mut self.plan
    }

    pub fn set_plan(&mut self, plan: Plan) {
        self.plan = plan;
    }

    /// Drop the cached plan. The only way a plan is thrown away before it
    /// is replaced.
    pub fn invalidate(&mut self) {
        self.plan.reset();
    }

    /// Where this player is heading: home with the flag, the flag otherwise.
    pub fn target(&self) -> Position {
        if self.has_flag {
            self.base_position
        } else {
            self.flag_position
        }
    }

    /// The move budget has just been refilled.
    pub fn is_round_start(&self) -> bool {
        self.moves_left >= self.max_moves_per_round
    }

    pub fn is_home(&self) -> bool {
        self.position == self.base_position
    }

    pub fn sees(&self, pos: &Position) -> bool {
        self.position.chebyshev(pos) <= self.view_range
    }

    /// Move points needed to enter `pos`.
    pub fn step_cost(&self, grid: &Grid, pos: &Position) -> f64 {
        let cost = grid.cost(pos);
        if self.has_flag {
            cost + FLAG_CARRY_PENALTY
        } else {
            cost
        }
    }

    /// Whether this player can walk all of `plan` with `move_points`. Steps
    /// taken with the flag cost extra, including those after picking it up
    /// on the way.
    pub fn can_reach(&self, plan: &Plan, move_points: f64) -> bool {
        let mut required = plan.move_cost();
        if self.has_flag {
            required += FLAG_CARRY_PENALTY * plan.len() as f64;
        } else if let Some(idx) = plan.location_index(self.flag_position) {
            required += FLAG_CARRY_PENALTY * idx as f64;
        }
        required <= move_points
    }
}
