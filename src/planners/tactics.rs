//! Per-move tactics for a single player facing at most one opponent.
//!
//! Without a visible opponent the player walks to its target. With one in
//! sight it attacks when the opponent can be reached this round, and
//! otherwise retreats to a nearby cell the opponent cannot reach, as long as
//! such a cell exists.

use tracing::{debug, trace};

use crate::infra::{PathError, Pathfinder, Plan, PlanStatus, Position, SearchMode, step_direction};
use crate::protocol::Direction;
use crate::state::{Grid, PlayerState};

/// Upper bound on the radius searched for safe cells, whatever the view range.
pub const MAX_COMPUTATION_RANGE: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    /// Walk to the flag or back home.
    Advance(Position),
    /// Chase an opponent reachable this round.
    Attack(Position),
    /// Retreat from the opponent to a cell it cannot reach.
    Avoid { enemy: Position, haven: Position },
    /// No safe cell; head for the target anyway.
    Fallback(Position),
    /// Keep walking the plan cached earlier this round.
    Continue,
    /// Nothing to do this move.
    Hold,
}

/// Pick the move for `player`. The cached plan is invalidated at the start of
/// every round and on arriving home, then reused for the rest of the round.
#[tracing::instrument(level = "debug", skip_all, fields(player = player.id))]
pub fn decide(
    player: &mut PlayerState,
    grid: &Grid,
    pathfinder: &mut Pathfinder,
    opponent: Option<&PlayerState>,
) -> Result<(Tactic, Direction), PathError> {
    if player.is_round_start() || player.is_home() {
        player.invalidate();
    }

    let target = player.target();
    if !player.is_alive || player.position == target {
        return Ok((Tactic::Hold, Direction::NoMove));
    }

    let tactic = match player.plan().status() {
        PlanStatus::Finished => {
            debug!("Plan exhausted, waiting for the next round");
            return Ok((Tactic::Hold, Direction::NoMove));
        }
        PlanStatus::InProgress => {
            trace!(next = ?player.plan().peek(), "Continuing cached plan");
            Tactic::Continue
        }
        PlanStatus::Empty => {
            let (tactic, plan) = calculate_path(player, grid, pathfinder, target, opponent)?;
            debug!(
                from = ?plan.start(),
                steps = plan.len(),
                move_cost = plan.move_cost(),
                "New plan for {:?}",
                tactic
            );
            player.set_plan(plan);
            tactic
        }
    };

    Ok((tactic, take_step(player, grid)))
}

/// Build a fresh plan towards `target`, taking the opponent into account.
pub fn calculate_path(
    player: &PlayerState,
    grid: &Grid,
    pathfinder: &mut Pathfinder,
    target: Position,
    opponent: Option<&PlayerState>,
) -> Result<(Tactic, Plan), PathError> {
    let Some(enemy) = opponent.filter(|enemy| enemy.visible && enemy.is_alive) else {
        let plan = pathfinder.find(grid, player.position, target, SearchMode::Greedy, &[])?;
        return Ok((Tactic::Advance(target), plan));
    };

    if let Some(plan) = attack(player, grid, pathfinder, enemy)? {
        return Ok((Tactic::Attack(enemy.position), plan));
    }

    if let Some((haven, plan)) = avoid(player, grid, pathfinder, target, enemy) {
        return Ok((
            Tactic::Avoid {
                enemy: enemy.position,
                haven,
            },
            plan,
        ));
    }

    debug!("No safe cell around {:?}, taking the risk", player.position);
    let plan = pathfinder.find(grid, player.position, target, SearchMode::Greedy, &[])?;
    Ok((Tactic::Fallback(target), plan))
}

/// A plan reaching `enemy` within this round's budget, if there is one.
fn attack(
    player: &PlayerState,
    grid: &Grid,
    pathfinder: &mut Pathfinder,
    enemy: &PlayerState,
) -> Result<Option<Plan>, PathError> {
    let direct = pathfinder.find(grid, player.position, enemy.position, SearchMode::Accurate, &[])?;
    if player.can_reach(&direct, player.moves_left) {
        return Ok(Some(direct));
    }

    // Picking up the flag on the way slows us down; try to route around it
    let flag = player.flag_position;
    let flag_free = !player.has_flag && !enemy.has_flag;
    if flag_free && player.sees(&flag) && flag != player.position && flag != enemy.position {
        match pathfinder.find(grid, player.position, enemy.position, SearchMode::Accurate, &[flag]) {
            Ok(detour) if player.can_reach(&detour, player.moves_left) => return Ok(Some(detour)),
            Ok(_) | Err(PathError::Unreachable { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(None)
}

/// Cheapest nearby cell, measured by the onward cost to `target`, that this
/// player reaches this round and the opponent cannot reach next round.
fn avoid(
    player: &PlayerState,
    grid: &Grid,
    pathfinder: &mut Pathfinder,
    target: Position,
    enemy: &PlayerState,
) -> Option<(Position, Plan)> {
    let radius = player.view_range.min(MAX_COMPUTATION_RANGE);
    let mut best: Option<(f64, Position, Plan)> = None;

    for cell in grid.neighbors_in_radius(player.position, radius) {
        let pos = cell.pos;
        if pos == player.position || pos.distance(&enemy.position) <= 1 {
            continue;
        }

        match pathfinder.find(grid, enemy.position, pos, SearchMode::Accurate, &[]) {
            Ok(threat) if enemy.can_reach(&threat, enemy.max_moves_per_round) => continue,
            Ok(_) => {}
            Err(_) => continue,
        }

        let Ok(plan) = pathfinder.find(grid, player.position, pos, SearchMode::Accurate, &[]) else {
            continue;
        };
        if !player.can_reach(&plan, player.moves_left) {
            continue;
        }

        let onward = if pos == target {
            0.0
        } else {
            match pathfinder.find(grid, pos, target, SearchMode::Greedy, &[]) {
                Ok(onward) => onward.move_cost(),
                Err(_) => continue,
            }
        };

        if best.as_ref().is_none_or(|(cost, _, _)| onward < *cost) {
            best = Some((onward, pos, plan));
        }
    }

    best.map(|(_, haven, plan)| (haven, plan))
}

/// Consume the next step of the cached plan and turn it into a move, or stay
/// put when the step costs more than what is left this round.
fn take_step(player: &mut PlayerState, grid: &Grid) -> Direction {
    let step = player.plan_mut().next_step();
    let cost = player.step_cost(grid, &step);
    if cost > player.moves_left {
        debug!(cost, moves_left = player.moves_left, "Not enough moves for {:?}", step);
        return Direction::NoMove;
    }
    step_direction(player.position, step)
}
