use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    geom_id::GeomId,
    traits::{Block, Locate},
};

/// Calorimeter regions of the detector
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Display,
    EnumString,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Region {
    /// Main calorimeter walls, address `module.side.column.row`
    MainWall,
    /// Calorimeter walls closing the tracker at both ends,
    /// address `module.side.wall.column.row`
    XWall,
    /// Gamma veto above and below the tracker, address
    /// `module.side.wall.column`
    GammaVeto,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Cell {
    side: u32,
    wall: u32,
    column: u32,
    row: u32,
}

/// Locator for a region made of rectangular walls of blocks
///
/// Every side of the detector holds `walls` walls of `columns` x `rows`
/// blocks. Neighbours are the blocks sharing an edge inside the same
/// wall, or also a corner if `diagonal` is set.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridLocator {
    pub region: Region,
    /// Geometry type of the blocks
    pub kind: u32,
    #[serde(default)]
    pub module: u32,
    #[serde(default = "two")]
    pub sides: u32,
    #[serde(default = "one")]
    pub walls: u32,
    pub columns: u32,
    #[serde(default = "one")]
    pub rows: u32,
    #[serde(default)]
    pub diagonal: bool,
}

fn one() -> u32 {
    1
}

fn two() -> u32 {
    2
}

impl GridLocator {
    /// Main wall of the SuperNEMO demonstrator
    pub fn main_wall() -> Self {
        Self {
            region: Region::MainWall,
            kind: 1302,
            module: 0,
            sides: 2,
            walls: 1,
            columns: 20,
            rows: 13,
            diagonal: false,
        }
    }

    /// X-walls of the SuperNEMO demonstrator
    pub fn x_wall() -> Self {
        Self {
            region: Region::XWall,
            kind: 1232,
            module: 0,
            sides: 2,
            walls: 2,
            columns: 2,
            rows: 16,
            diagonal: false,
        }
    }

    /// Gamma veto of the SuperNEMO demonstrator
    pub fn gamma_veto() -> Self {
        Self {
            region: Region::GammaVeto,
            kind: 1252,
            module: 0,
            sides: 2,
            walls: 2,
            columns: 16,
            rows: 1,
            diagonal: false,
        }
    }

    /// Geometry id of the block at the given position
    pub fn block(
        &self,
        side: u32,
        wall: u32,
        column: u32,
        row: u32,
    ) -> GeomId {
        self.to_id(Cell {
            side,
            wall,
            column,
            row,
        })
    }

    fn to_id(&self, c: Cell) -> GeomId {
        let m = self.module;
        let id = match self.region {
            Region::MainWall => GeomId::new(self.kind, &[m, c.side, c.column, c.row]),
            Region::XWall => {
                GeomId::new(self.kind, &[m, c.side, c.wall, c.column, c.row])
            }
            Region::GammaVeto => {
                GeomId::new(self.kind, &[m, c.side, c.wall, c.column])
            }
        };
        // all addresses above are shorter than MAX_DEPTH
        id.unwrap_or_default()
    }

    fn to_cell(&self, id: &GeomId) -> Option<Cell> {
        if id.kind() != self.kind {
            return None;
        }
        let cell = match (self.region, id.address()) {
            (Region::MainWall, &[m, side, column, row]) if m == self.module => {
                Cell { side, wall: 0, column, row }
            }
            (Region::XWall, &[m, side, wall, column, row]) if m == self.module => {
                Cell { side, wall, column, row }
            }
            (Region::GammaVeto, &[m, side, wall, column]) if m == self.module => {
                Cell { side, wall, column, row: 0 }
            }
            _ => return None,
        };
        let inside = cell.side < self.sides
            && cell.wall < self.walls
            && cell.column < self.columns
            && cell.row < self.rows;
        inside.then_some(cell)
    }
}

impl Locate<GeomId> for GridLocator {
    fn owns_block(&self, block: &GeomId) -> bool {
        self.to_cell(block).is_some()
    }

    fn neighbours(&self, block: &GeomId) -> Vec<GeomId> {
        let Some(cell) = self.to_cell(block) else {
            return Vec::new();
        };
        let mut res = Vec::with_capacity(8);
        for dcol in -1i64..=1 {
            for drow in -1i64..=1 {
                if (dcol, drow) == (0, 0) {
                    continue;
                }
                if !self.diagonal && dcol != 0 && drow != 0 {
                    continue;
                }
                let column = cell.column as i64 + dcol;
                let row = cell.row as i64 + drow;
                if column < 0
                    || row < 0
                    || column >= self.columns as i64
                    || row >= self.rows as i64
                {
                    continue;
                }
                res.push(self.to_id(Cell {
                    column: column as u32,
                    row: row as u32,
                    ..cell
                }));
            }
        }
        res
    }
}

/// Locator defined by an explicit table of neighbours
///
/// Adjacency is symmetric: adding `b` as neighbour of `a` also adds
/// `a` as neighbour of `b`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyLocator<B> {
    neighbours: BTreeMap<B, BTreeSet<B>>,
}

impl<B: Block> AdjacencyLocator<B> {
    pub fn new() -> Self {
        Self {
            neighbours: BTreeMap::new(),
        }
    }

    /// Mark `a` and `b` as neighbours
    pub fn connect(&mut self, a: B, b: B) -> &mut Self {
        if a != b {
            self.neighbours.entry(a).or_default().insert(b);
            self.neighbours.entry(b).or_default().insert(a);
        }
        self
    }

    /// Add a block without any neighbours
    pub fn add_block(&mut self, a: B) -> &mut Self {
        self.neighbours.entry(a).or_default();
        self
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}

impl<B: Block> FromIterator<(B, B)> for AdjacencyLocator<B> {
    fn from_iter<I: IntoIterator<Item = (B, B)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (a, b) in iter {
            res.connect(a, b);
        }
        res
    }
}

impl<B: Block> Locate<B> for AdjacencyLocator<B> {
    fn owns_block(&self, block: &B) -> bool {
        self.neighbours.contains_key(block)
    }

    fn neighbours(&self, block: &B) -> Vec<B> {
        self.neighbours
            .get(block)
            .map(|n| n.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Neighbour relation merged from several locators
///
/// A block is owned by the graph if any locator owns it. Its
/// neighbours are the union of the neighbours reported by all
/// locators owning it.
pub struct NeighbourGraph<B> {
    locators: Vec<Box<dyn Locate<B> + Send + Sync>>,
}

impl<B: Block> Default for NeighbourGraph<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Block> NeighbourGraph<B> {
    pub fn new() -> Self {
        Self {
            locators: Vec::new(),
        }
    }

    /// Add a locator
    pub fn with_locator<L>(mut self, locator: L) -> Self
    where
        L: Locate<B> + Send + Sync + 'static,
    {
        self.locators.push(Box::new(locator));
        self
    }

    /// Number of locators
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Sorted and deduplicated neighbours of a block
    pub fn neighbour_set(&self, block: &B) -> BTreeSet<B> {
        self.locators
            .iter()
            .filter(|l| l.owns_block(block))
            .flat_map(|l| l.neighbours(block))
            .filter(|n| n != block)
            .collect()
    }
}

impl<B: Block> Locate<B> for NeighbourGraph<B> {
    fn owns_block(&self, block: &B) -> bool {
        self.locators.iter().any(|l| l.owns_block(block))
    }

    fn neighbours(&self, block: &B) -> Vec<B> {
        self.neighbour_set(block).into_iter().collect()
    }
}

/// Geometry description
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GeometryConfig {
    #[serde(default = "default_locators")]
    pub locators: Vec<GridLocator>,
    /// Additional neighbour pairs, e.g. for blocks across region borders
    #[serde(default)]
    pub adjacency: Vec<(GeomId, GeomId)>,
}

fn default_locators() -> Vec<GridLocator> {
    vec![
        GridLocator::main_wall(),
        GridLocator::x_wall(),
        GridLocator::gamma_veto(),
    ]
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            locators: default_locators(),
            adjacency: Vec::new(),
        }
    }
}

impl From<&GeometryConfig> for NeighbourGraph<GeomId> {
    fn from(config: &GeometryConfig) -> Self {
        let mut graph = NeighbourGraph::new();
        for locator in &config.locators {
            graph = graph.with_locator(*locator);
        }
        if !config.adjacency.is_empty() {
            let extra: AdjacencyLocator<_> =
                config.adjacency.iter().copied().collect();
            graph = graph.with_locator(extra);
        }
        graph
    }
}
