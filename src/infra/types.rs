#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Straight-line distance, used as the search heuristic.
    pub fn euclidean(&self, other: &Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn chebyshev(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.x - 1, self.y), // Left
            Position::new(self.x + 1, self.y), // Right
            Position::new(self.x, self.y + 1), // Down
            Position::new(self.x, self.y - 1), // Up
        ]
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }
}

/// A coordinate annotated with a cost. Depending on where it comes from the
/// cost is either the terrain cost of the cell or a search priority.
/// Two cells are equal when they sit on the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub pos: Position,
    pub cost: f64,
}

impl Cell {
    pub fn new(pos: Position, cost: f64) -> Self {
        Self { pos, cost }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for Cell {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn from_center_and_range(center: Position, range: i32) -> Self {
        Self {
            min_x: center.x - range,
            max_x: center.x + range,
            min_y: center.y - range,
            max_y: center.y + range,
        }
    }

    /// Shrink the box so it lies within a `width` x `height` map.
    pub fn clamp_to(&self, width: i32, height: i32) -> Self {
        Self {
            min_x: self.min_x.clamp(0, width - 1),
            max_x: self.max_x.clamp(0, width - 1),
            min_y: self.min_y.clamp(0, height - 1),
            max_y: self.max_y.clamp(0, height - 1),
        }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    /// Positions inside the box in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| Position::new(x, y)))
    }
}
