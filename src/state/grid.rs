use tracing::{debug, warn};

use crate::infra::{Bounds, Cell, Position};
use crate::protocol::MapRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Unknown,
    Standard,
    Water,
    Marsh,
}

impl Terrain {
    pub const KNOWN: [Terrain; 3] = [Terrain::Standard, Terrain::Water, Terrain::Marsh];

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Terrain::Unknown),
            1 => Some(Terrain::Standard),
            2 => Some(Terrain::Water),
            3 => Some(Terrain::Marsh),
            _ => None,
        }
    }

    /// Movement cost of a known terrain, `None` for `Unknown`.
    pub fn cost(&self) -> Option<f64> {
        match self {
            Terrain::Unknown => None,
            Terrain::Standard => Some(1.0),
            Terrain::Water => Some(2.0),
            Terrain::Marsh => Some(3.0),
        }
    }
}

/// Risk-adjusted estimate for unobserved cells: mean of the known terrain
/// costs minus half their sample standard deviation.
fn unknown_terrain_cost() -> f64 {
    let costs: Vec<f64> = Terrain::KNOWN.iter().filter_map(Terrain::cost).collect();
    let n = costs.len() as f64;
    let mean = costs.iter().sum::<f64>() / n;
    let variance = costs.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
    mean - variance.sqrt() / 2.0
}

/// Terrain knowledge over a fixed-size map. Cells start out unknown and are
/// filled in as snapshots reveal them; known terrain is never forgotten.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    unknown_cost: f64,
    cells: Vec<Terrain>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            unknown_cost: unknown_terrain_cost(),
            cells: vec![Terrain::Unknown; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn unknown_cost(&self) -> f64 {
        self.unknown_cost
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0, self.width - 1, 0, self.height - 1)
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.bounds().contains(pos)
    }

    fn index(&self, pos: &Position) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn terrain(&self, pos: &Position) -> Terrain {
        self.index(pos)
            .map(|idx| self.cells[idx])
            .unwrap_or(Terrain::Unknown)
    }

    pub fn set(&mut self, pos: Position, terrain: Terrain) {
        if let Some(idx) = self.index(&pos) {
            self.cells[idx] = terrain;
        }
    }

    pub fn cost(&self, pos: &Position) -> f64 {
        self.terrain(pos).cost().unwrap_or(self.unknown_cost)
    }

    pub fn known_cells(&self) -> usize {
        self.cells.iter().filter(|t| **t != Terrain::Unknown).count()
    }

    /// Merge a snapshot into the grid. Only observed cells are written.
    /// A snapshot of different dimensions is rejected as a whole.
    pub fn update(&mut self, map: &MapRecord) -> bool {
        if map.width != self.width || map.height != self.height {
            warn!(
                "Invalid map size {}x{}, expected {}x{}",
                map.width, map.height, self.width, self.height
            );
            return false;
        }

        for (y, row) in map.fields.iter().enumerate().take(self.height as usize) {
            for (x, code) in row.iter().enumerate().take(self.width as usize) {
                let terrain = match Terrain::from_code(*code) {
                    Some(terrain) => terrain,
                    None => {
                        debug!("Unrecognised terrain code {} at ({}, {})", code, x, y);
                        Terrain::Unknown
                    }
                };
                if terrain != Terrain::Unknown {
                    self.set(Position::new(x as i32, y as i32), terrain);
                }
            }
        }
        true
    }

    /// Every in-bounds cell within `radius` of `center` (square box), with its
    /// current cost.
    pub fn neighbors_in_radius(&self, center: Position, radius: i32) -> Vec<Cell> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        Bounds::from_center_and_range(center, radius)
            .clamp_to(self.width, self.height)
            .positions()
            .map(|pos| Cell::new(pos, self.cost(&pos)))
            .collect()
    }
}
