use crate::infra::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// No route, or the route was reset.
    Empty,
    /// Steps remain to be consumed.
    InProgress,
    /// The last step has been consumed.
    Finished,
}

/// A route produced by the pathfinder and consumed one step at a time.
///
/// Steps are stored target-first so that consuming the next step is a pop
/// from the back of the vector.
#[derive(Debug, Clone)]
pub struct Plan {
    start: Position,
    steps: Vec<Position>,
    move_cost: f64,
    status: PlanStatus,
}

impl Plan {
    /// Build a plan from steps in travel order (first step first, target last).
    /// The start cell itself must not be part of `route`.
    pub fn new(start: Position, mut route: Vec<Position>, move_cost: f64) -> Self {
        route.reverse();
        let status = if route.is_empty() {
            PlanStatus::Empty
        } else {
            PlanStatus::InProgress
        };
        Self {
            start,
            steps: route,
            move_cost,
            status,
        }
    }

    pub fn empty(start: Position) -> Self {
        Self::new(start, Vec::new(), 0.0)
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// Sum of the terrain costs of all steps, start cell excluded.
    pub fn move_cost(&self) -> f64 {
        self.move_cost
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn peek(&self) -> Option<Position> {
        self.steps.last().copied()
    }

    pub fn target(&self) -> Option<Position> {
        self.steps.first().copied()
    }

    /// Remaining steps in travel order.
    pub fn steps(&self) -> impl Iterator<Item = Position> + '_ {
        self.steps.iter().rev().copied()
    }

    /// Consume the next step. An exhausted plan keeps answering with its
    /// start cell.
    pub fn next_step(&mut self) -> Position {
        match self.steps.pop() {
            Some(step) => {
                if self.steps.is_empty() {
                    self.status = PlanStatus::Finished;
                }
                step
            }
            None => self.start,
        }
    }

    /// Index of `pos` counted from the target end of the remaining route,
    /// which is the number of steps still taken after reaching `pos`.
    pub fn location_index(&self, pos: Position) -> Option<usize> {
        self.steps.iter().position(|step| *step == pos)
    }

    pub fn reset(&mut self) {
        self.steps.clear();
        self.move_cost = 0.0;
        self.status = PlanStatus::Empty;
    }
}
