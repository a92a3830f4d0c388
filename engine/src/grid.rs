//! Discrete battle map.
//!
//! The grid keeps three views of the same facts: an occupancy matrix, a
//! token → position map and a position → token map. Every mutation goes
//! through [`Grid::add`], [`Grid::move_to`] or [`Grid::remove`], which update
//! all three together.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::Dice;
use crate::ids::{IdAllocator, TokenId};
use crate::token::Token;

pub const START_ZONE_RADIUS: u32 = 2;
const EMPTY_GLYPH: char = '·';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("token {0} is not on the grid")]
    NotOnGrid(TokenId),
    #[error("token {0} is already on the grid")]
    AlreadyPlaced(TokenId),
    #[error("cell {pos} is already occupied by token {by}")]
    Occupied { pos: Pos, by: TokenId },
    #[error("grid index corrupted: token {id} and cell {pos} disagree")]
    IndexMismatch { id: TokenId, pos: Pos },
    #[error("grid index corrupted: cell {0} is marked occupied but holds no token")]
    StrayOccupancy(Pos),
    #[error("map matrix is empty")]
    EmptyMap,
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown map glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// A `(row, col)` cell. Coordinates are signed so out-of-range requests can
/// be expressed and clamped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Up, down, left, right; not bounds checked.
    pub fn neighbors(self) -> [Pos; 4] {
        [
            Pos::new(self.row - 1, self.col),
            Pos::new(self.row + 1, self.col),
            Pos::new(self.row, self.col - 1),
            Pos::new(self.row, self.col + 1),
        ]
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Pos {
    fn from((row, col): (i32, i32)) -> Self {
        Pos::new(row, col)
    }
}

/// Traversable-neighbor graph over every cell of a grid snapshot.
///
/// Each cell maps to its in-bounds, unoccupied 4-neighbors. Occupied cells
/// still get an entry (so a token can path out of its own cell) but never
/// appear as anyone's neighbor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    edges: BTreeMap<Pos, Vec<Pos>>,
}

impl Adjacency {
    pub fn neighbors(&self, pos: Pos) -> &[Pos] {
        self.edges.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &[Pos])> {
        self.edges.iter().map(|(p, n)| (*p, n.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartZone {
    pub origin: Pos,
    /// Non-wall cells within [`START_ZONE_RADIUS`] of `origin` when the zone was set.
    pub cells: BTreeSet<Pos>,
}

#[derive(Debug, Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    occupied: Vec<bool>,
    positions: HashMap<TokenId, Pos>,
    tokens: HashMap<Pos, TokenId>,
    icons: HashMap<TokenId, char>,
    walls: BTreeSet<TokenId>,
    start_zones: BTreeMap<usize, StartZone>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        let height = height.max(1);
        let width = width.max(1);
        Self {
            height,
            width,
            occupied: vec![false; height * width],
            positions: HashMap::new(),
            tokens: HashMap::new(),
            icons: HashMap::new(),
            walls: BTreeSet::new(),
            start_zones: BTreeMap::new(),
        }
    }

    /// Build a grid from map rows: `.` empty, `#` wall, `1`/`2` start marker
    /// for team slot 0/1. Whitespace inside a row is ignored.
    pub fn from_map_matrix<R: AsRef<[char]>>(ids: &mut IdAllocator, rows: &[R]) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(GridError::EmptyMap);
        }
        let mut grid = Grid::new(rows.len(), width);
        let mut markers = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GridError::RaggedMap {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (c, glyph) in row.iter().enumerate() {
                let pos = Pos::new(r as i32, c as i32);
                match glyph {
                    '.' => {}
                    '#' => grid.add_wall(Token::wall(ids), pos)?,
                    '1' | '2' => markers.push((*glyph as usize - '1' as usize, pos)),
                    other => {
                        return Err(GridError::UnknownGlyph {
                            glyph: *other,
                            row: r,
                            col: c,
                        });
                    }
                }
            }
        }
        for (team, origin) in markers {
            grid.set_start_zone(team, origin);
        }
        Ok(grid)
    }

    /// Text form of [`Grid::from_map_matrix`]; blank lines are skipped.
    pub fn from_map_str(ids: &mut IdAllocator, text: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|r| !r.is_empty())
            .collect();
        Self::from_map_matrix(ids, &rows)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Rendered `(columns, lines)` of the console snapshot.
    pub fn screen_size(&self) -> (usize, usize) {
        (2 * self.width + 1, self.height + 2)
    }

    pub fn clamp(&self, pos: Pos) -> Pos {
        Pos::new(
            pos.row.clamp(0, self.height as i32 - 1),
            pos.col.clamp(0, self.width as i32 - 1),
        )
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        (0..self.height as i32).contains(&pos.row) && (0..self.width as i32).contains(&pos.col)
    }

    fn index(&self, pos: Pos) -> usize {
        pos.row as usize * self.width + pos.col as usize
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.occupied[self.index(pos)]
    }

    pub fn is_traversable(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && !self.occupied[self.index(pos)]
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height as i32).flat_map(move |r| (0..self.width as i32).map(move |c| Pos::new(r, c)))
    }

    /// Unoccupied cells in row-major order.
    pub fn free_cells(&self) -> Vec<Pos> {
        self.cells().filter(|p| self.is_traversable(*p)).collect()
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn position(&self, id: TokenId) -> Result<Pos, GridError> {
        self.positions.get(&id).copied().ok_or(GridError::NotOnGrid(id))
    }

    pub fn token_at(&self, pos: Pos) -> Option<TokenId> {
        self.tokens.get(&pos).copied()
    }

    pub fn token_count(&self) -> usize {
        self.positions.len()
    }

    pub fn start_zone(&self, team: usize) -> Option<&StartZone> {
        self.start_zones.get(&team)
    }

    pub fn set_start_zone(&mut self, team: usize, origin: Pos) {
        let origin = self.clamp(origin);
        let cells = self
            .cells()
            .filter(|p| p.manhattan(origin) <= START_ZONE_RADIUS)
            .filter(|p| !self.token_at(*p).is_some_and(|t| self.walls.contains(&t)))
            .collect();
        self.start_zones.insert(team, StartZone { origin, cells });
    }

    /// Unoccupied cells of `team`'s start zone, growing the radius one step
    /// at a time until something is free or the whole grid is covered.
    fn start_candidates(&self, team: usize) -> Vec<Pos> {
        let Some(zone) = self.start_zones.get(&team) else {
            return Vec::new();
        };
        let free: Vec<Pos> = zone
            .cells
            .iter()
            .copied()
            .filter(|p| self.is_traversable(*p))
            .collect();
        if !free.is_empty() {
            return free;
        }
        let limit = (self.height + self.width) as u32;
        (START_ZONE_RADIUS + 1..=limit)
            .map(|radius| {
                self.cells()
                    .filter(|p| p.manhattan(zone.origin) <= radius && self.is_traversable(*p))
                    .collect::<Vec<_>>()
            })
            .find(|cells| !cells.is_empty())
            .unwrap_or_default()
    }

    /// Place `token`. Without `pos` a free cell is drawn at random, from
    /// `team`'s start zone when it has one. Returns `Ok(false)` when the
    /// grid has no free cell left.
    pub fn add(&mut self, token: &Token, pos: Option<Pos>, team: Option<usize>, dice: &mut Dice) -> Result<bool, GridError> {
        if self.contains(token.id) {
            return Err(GridError::AlreadyPlaced(token.id));
        }
        let pos = match pos {
            Some(pos) => {
                let pos = self.clamp(pos);
                if let Some(by) = self.token_at(pos) {
                    return Err(GridError::Occupied { pos, by });
                }
                pos
            }
            None => {
                let mut candidates = team.map(|t| self.start_candidates(t)).unwrap_or_default();
                if candidates.is_empty() {
                    candidates = self.free_cells();
                }
                match dice.pick_index(candidates.len()) {
                    Some(i) => candidates[i],
                    None => return Ok(false),
                }
            }
        };
        self.insert(token.id, token.icon, pos);
        Ok(true)
    }

    fn add_wall(&mut self, wall: Token, pos: Pos) -> Result<(), GridError> {
        if let Some(by) = self.token_at(pos) {
            return Err(GridError::Occupied { pos, by });
        }
        self.walls.insert(wall.id);
        self.insert(wall.id, wall.icon, pos);
        Ok(())
    }

    /// Place a wall at `pos` (clamped).
    pub fn add_wall_at(&mut self, ids: &mut IdAllocator, pos: Pos) -> Result<TokenId, GridError> {
        let wall = Token::wall(ids);
        let id = wall.id;
        self.add_wall(wall, self.clamp(pos))?;
        Ok(id)
    }

    fn insert(&mut self, id: TokenId, icon: char, pos: Pos) {
        let idx = self.index(pos);
        self.occupied[idx] = true;
        self.positions.insert(id, pos);
        self.tokens.insert(pos, id);
        self.icons.insert(id, icon);
    }

    /// Move a placed token to `pos` (clamped). Moving onto the current cell
    /// changes nothing. Returns the cell the token ends up on.
    pub fn move_to(&mut self, id: TokenId, pos: Pos) -> Result<Pos, GridError> {
        let current = self.position(id)?;
        if self.token_at(current) != Some(id) {
            return Err(GridError::IndexMismatch { id, pos: current });
        }
        let dest = self.clamp(pos);
        if dest == current {
            return Ok(current);
        }
        if let Some(by) = self.token_at(dest) {
            return Err(GridError::Occupied { pos: dest, by });
        }
        let from = self.index(current);
        let to = self.index(dest);
        self.occupied[from] = false;
        self.occupied[to] = true;
        self.tokens.remove(&current);
        self.tokens.insert(dest, id);
        self.positions.insert(id, dest);
        Ok(dest)
    }

    pub fn remove(&mut self, id: TokenId) -> Result<Pos, GridError> {
        let pos = self.positions.remove(&id).ok_or(GridError::NotOnGrid(id))?;
        if self.tokens.remove(&pos) != Some(id) {
            return Err(GridError::IndexMismatch { id, pos });
        }
        let idx = self.index(pos);
        self.occupied[idx] = false;
        self.icons.remove(&id);
        self.walls.remove(&id);
        Ok(pos)
    }

    /// Remove every token except walls; start zones are kept.
    pub fn clear_characters(&mut self) -> Result<(), GridError> {
        let ids: Vec<TokenId> = self
            .positions
            .keys()
            .copied()
            .filter(|id| !self.walls.contains(id))
            .collect();
        for id in ids {
            self.remove(id)?;
        }
        Ok(())
    }

    /// Recomputed from current occupancy on every call.
    pub fn adjacency(&self) -> Adjacency {
        let edges = self
            .cells()
            .map(|p| {
                let open = p
                    .neighbors()
                    .into_iter()
                    .filter(|n| self.is_traversable(*n))
                    .collect();
                (p, open)
            })
            .collect();
        Adjacency { edges }
    }

    /// Whether `b` sits on one of `a`'s four neighboring cells.
    pub fn is_adjacent(&self, a: TokenId, b: TokenId) -> Result<bool, GridError> {
        Ok(self.position(a)?.manhattan(self.position(b)?) == 1)
    }

    /// Check that the occupancy matrix and both maps describe the same layout.
    pub fn verify(&self) -> Result<(), GridError> {
        for (id, pos) in &self.positions {
            if self.tokens.get(pos) != Some(id) || !self.is_occupied(*pos) {
                return Err(GridError::IndexMismatch { id: *id, pos: *pos });
            }
        }
        for (pos, id) in &self.tokens {
            if self.positions.get(id) != Some(pos) {
                return Err(GridError::IndexMismatch { id: *id, pos: *pos });
            }
        }
        let occupied = self.occupied.iter().filter(|o| **o).count();
        if occupied != self.tokens.len() {
            if let Some(pos) = self.cells().find(|p| self.is_occupied(*p) && self.token_at(*p).is_none()) {
                return Err(GridError::StrayOccupancy(pos));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hline = "━".repeat(2 * self.width - 1);
        writeln!(f, "┏{hline}┓")?;
        for r in 0..self.height as i32 {
            let row: Vec<String> = (0..self.width as i32)
                .map(|c| {
                    self.token_at(Pos::new(r, c))
                        .and_then(|id| self.icons.get(&id))
                        .copied()
                        .unwrap_or(EMPTY_GLYPH)
                        .to_string()
                })
                .collect();
            writeln!(f, "┃{}┃", row.join(" "))?;
        }
        write!(f, "┗{hline}┛")
    }
}
