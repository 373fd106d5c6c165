//! One-ply hazard-avoidance move engine.
//!
//! Every call builds a fresh [`HazardGrid`], classifies the four directions around our head as
//! safe or dangerous, and picks uniformly among the safe ones. When nothing is safe a forced move
//! is chosen deterministically so the call always terminates.
//!
//! # Example
//! ```
//! use hazard_snake::engine::{decide, Board, Coord, Direction, Snake};
//!
//! let me = Snake::new("me", 100, vec![Coord::new(0, 5), Coord::new(1, 5)]).unwrap();
//! let board = Board::new(10, 10, vec![me.clone()], me).unwrap();
//! assert_ne!(decide(&board), Direction::Left);
//! ```

use std::fmt;

use rand::{seq::IndexedRandom, Rng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::BoardError;
use crate::grid::{Cell, HazardGrid};

pub const MAX_HEALTH: u32 = 100;
pub const DEFAULT_WALL_BUFFER: i32 = 1;
/// Largest accepted width or height; official boards top out at 25.
pub const MAX_BOARD_DIM: i32 = 25;

// =============================================================================
// Direction
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    #[default]
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    #[inline(always)]
    pub const fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Rows grow downward, so `Up` decreases `y`.
    #[inline(always)]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    #[inline(always)]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// The two directions at right angles to this one.
    #[inline(always)]
    pub const fn sideways(self) -> [Direction; 2] {
        if self.is_vertical() {
            [Direction::Right, Direction::Left]
        } else {
            [Direction::Down, Direction::Up]
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Board snapshot
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    #[inline(always)]
    pub const fn step(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.delta();
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    id: String,
    health: u32,
    body: Vec<Coord>,
}

impl Snake {
    pub fn new(id: impl Into<String>, health: u32, body: Vec<Coord>) -> Result<Self, BoardError> {
        let id = id.into();
        if health > MAX_HEALTH {
            return Err(BoardError::Health { snake: id, health });
        }
        Ok(Snake { id, health, body })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn body(&self) -> &[Coord] {
        &self.body
    }

    /// Callers go through [`Board::new`], which guarantees our own body is non-empty.
    pub fn head(&self) -> Coord {
        self.body[0]
    }
}

/// A validated snapshot: dimensions in `1..=MAX_BOARD_DIM`, every segment on the board, and a
/// non-empty body for `you`. The engine relies on these and never re-checks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    snakes: Vec<Snake>,
    you: Snake,
}

impl Board {
    pub fn new(
        width: i32,
        height: i32,
        snakes: Vec<Snake>,
        you: Snake,
    ) -> Result<Self, BoardError> {
        if width <= 0 || height <= 0 {
            return Err(BoardError::Dimensions { width, height });
        }
        if width > MAX_BOARD_DIM || height > MAX_BOARD_DIM {
            return Err(BoardError::TooLarge {
                width,
                height,
                max: MAX_BOARD_DIM,
            });
        }
        if you.body.is_empty() {
            return Err(BoardError::EmptyBody { snake: you.id });
        }
        for snake in snakes.iter().chain(std::iter::once(&you)) {
            for (segment, &coord) in snake.body.iter().enumerate() {
                if coord.x < 0 || coord.x >= width || coord.y < 0 || coord.y >= height {
                    return Err(BoardError::OutOfBounds {
                        snake: snake.id.clone(),
                        segment,
                        coord,
                        width,
                        height,
                    });
                }
            }
        }
        Ok(Board {
            width,
            height,
            snakes,
            you,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn you(&self) -> &Snake {
        &self.you
    }
}

// =============================================================================
// Direction sets
// =============================================================================

/// Bitset over the four directions, indexed by `Direction as u8`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct DangerSet(u8);

impl DangerSet {
    const FULL: u8 = 0b1111;

    pub const fn empty() -> Self {
        DangerSet(0)
    }

    #[inline(always)]
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir as u8;
    }

    #[inline(always)]
    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir as u8) != 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_full(self) -> bool {
        self.0 == Self::FULL
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::all().into_iter().filter(move |&d| self.contains(d))
    }

    /// Directions not in the set, in [`Direction::all`] order.
    pub fn complement(self) -> ArrayVec<Direction, 4> {
        let mut safe = ArrayVec::new();
        for dir in Direction::all() {
            if !self.contains(dir) {
                safe.push(dir);
            }
        }
        safe
    }
}

impl fmt::Debug for DangerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for DangerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dir) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dir}")?;
        }
        write!(f, "]")
    }
}

#[derive(Clone, Copy)]
pub struct ArrayVec<T: Copy, const N: usize> {
    data: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Default for ArrayVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> ArrayVec<T, N> {
    pub fn new() -> Self {
        ArrayVec {
            data: [T::default(); N],
            len: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, value: T) {
        if self.len < N {
            self.data[self.len] = value;
            self.len += 1;
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cells next to the edge treated as the edge itself.
    pub wall_buffer: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            wall_buffer: DEFAULT_WALL_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub danger: DangerSet,
    /// Every direction was dangerous; `direction` came from the fallback order.
    pub forced: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveEngine {
    config: EngineConfig,
}

impl MoveEngine {
    pub const fn new(config: EngineConfig) -> Self {
        MoveEngine { config }
    }

    pub fn decide<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Decision {
        let grid = HazardGrid::build(board);
        let danger = self.danger(board, &grid);

        debug!(
            snake = board.you().id(),
            head = %board.you().head(),
            health = board.you().health(),
            "hazard grid:\n{grid}"
        );
        debug!(%danger, "danger set");

        let safe = danger.complement();
        match safe.as_slice().choose(rng) {
            Some(&direction) => Decision {
                direction,
                danger,
                forced: false,
            },
            None => {
                let direction = forced_move(board.you().head(), &grid);
                warn!(%direction, "no safe move, forcing one");
                Decision {
                    direction,
                    danger,
                    forced: true,
                }
            }
        }
    }

    /// Directions that walk into the wall buffer or an occupied cell, plus curl-lookahead flags.
    pub fn danger(&self, board: &Board, grid: &HazardGrid) -> DangerSet {
        let head = board.you().head();
        let mut danger = DangerSet::empty();

        for dir in [
            Direction::Right,
            Direction::Left,
            Direction::Down,
            Direction::Up,
        ] {
            if !self.hits_wall(board, head, dir) && !grid.is_occupied(head.step(dir)) {
                continue;
            }
            danger.insert(dir);

            // Curl lookahead: a blocked vertical move also rules out turning into a body
            // segment beside the head. Those are the cells the horizontal checks read, so
            // this never widens the set.
            if dir.is_vertical() {
                for side in dir.sideways() {
                    if grid.is_occupied(head.step(side)) {
                        danger.insert(side);
                    }
                }
            }
        }

        danger
    }

    fn hits_wall(&self, board: &Board, head: Coord, dir: Direction) -> bool {
        let buffer = self.config.wall_buffer;
        match dir {
            Direction::Right => head.x >= board.width() - 1 - buffer,
            Direction::Left => head.x <= buffer,
            Direction::Down => head.y >= board.height() - 1 - buffer,
            Direction::Up => head.y <= buffer,
        }
    }
}

/// Least-bad pick when everything is dangerous: an on-board free cell inside the buffer, then
/// any on-board cell, then `Up`.
fn forced_move(head: Coord, grid: &HazardGrid) -> Direction {
    let on_board_free = |dir: Direction| grid.get(head.step(dir)) == Some(Cell::Empty);
    let on_board = |dir: Direction| grid.get(head.step(dir)).is_some();

    Direction::all()
        .into_iter()
        .find(|&d| on_board_free(d))
        .or_else(|| Direction::all().into_iter().find(|&d| on_board(d)))
        .unwrap_or(Direction::Up)
}

/// Default engine, thread-local randomness.
pub fn decide(board: &Board) -> Direction {
    MoveEngine::default()
        .decide(board, &mut rand::rng())
        .direction
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
impl Snake {
    pub(crate) fn from_points(id: &str, health: u32, points: &[(i32, i32)]) -> Snake {
        let body = points.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Snake::new(id, health, body).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SEEDS: u64 = 200;

    fn board(width: i32, height: i32, you: &[(i32, i32)], others: &[&[(i32, i32)]]) -> Board {
        let me = Snake::from_points("me", 80, you);
        let mut snakes = vec![me.clone()];
        for (i, body) in others.iter().enumerate() {
            snakes.push(Snake::from_points(&format!("enemy-{i}"), 80, body));
        }
        Board::new(width, height, snakes, me).unwrap()
    }

    fn danger_of(engine: &MoveEngine, b: &Board) -> DangerSet {
        engine.danger(b, &HazardGrid::build(b))
    }

    /// Every direction returned across many seeds.
    fn chosen(engine: &MoveEngine, b: &Board) -> Vec<Direction> {
        let mut seen = Vec::new();
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = engine.decide(b, &mut rng).direction;
            if !seen.contains(&d) {
                seen.push(d);
            }
        }
        seen
    }

    #[test]
    fn open_board_allows_every_direction() {
        let b = board(10, 10, &[(5, 5)], &[]);
        let engine = MoveEngine::default();
        assert!(danger_of(&engine, &b).is_empty());

        let seen = chosen(&engine, &b);
        assert_eq!(seen.len(), 4, "uniform choice should hit all four: {seen:?}");
    }

    #[test]
    fn left_edge_never_goes_left() {
        let b = board(10, 10, &[(0, 5)], &[]);
        let engine = MoveEngine::default();
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Left));
        assert!(!chosen(&engine, &b).contains(&Direction::Left));
    }

    #[test]
    fn wall_buffer_covers_the_cell_next_to_each_edge() {
        let engine = MoveEngine::default();
        let cases = [
            ((1, 5), Direction::Left),
            ((8, 5), Direction::Right),
            ((5, 1), Direction::Up),
            ((5, 8), Direction::Down),
        ];
        for ((x, y), dir) in cases {
            let b = board(10, 10, &[(x, y)], &[]);
            let danger = danger_of(&engine, &b);
            assert!(danger.contains(dir), "({x}, {y}) should block {dir}");
            assert_eq!(danger.len(), 1, "({x}, {y}) blocked {danger}");
        }
    }

    #[test]
    fn zero_buffer_checks_only_the_edge() {
        let engine = MoveEngine::new(EngineConfig { wall_buffer: 0 });
        let b = board(10, 10, &[(1, 5)], &[]);
        assert!(danger_of(&engine, &b).is_empty());

        let b = board(10, 10, &[(9, 0)], &[]);
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Right));
        assert!(danger.contains(Direction::Up));
        assert_eq!(danger.len(), 2);
    }

    #[test]
    fn corners_never_move_off_either_edge() {
        let engine = MoveEngine::default();
        for (x, y) in [(0, 0), (9, 0), (0, 9), (9, 9)] {
            let b = board(10, 10, &[(x, y)], &[]);
            for d in chosen(&engine, &b) {
                let next = Coord::new(x, y).step(d);
                assert!(
                    (0..10).contains(&next.x) && (0..10).contains(&next.y),
                    "({x}, {y}) stepped {d} off the board"
                );
            }
        }
    }

    #[test]
    fn occupied_neighbour_is_avoided() {
        let b = board(10, 10, &[(5, 5)], &[&[(6, 5), (7, 5)]]);
        let engine = MoveEngine::default();
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Right));
        assert_eq!(danger.len(), 1);
        assert!(!chosen(&engine, &b).contains(&Direction::Right));
    }

    #[test]
    fn own_neck_is_avoided() {
        let b = board(10, 10, &[(5, 5), (5, 6), (5, 7)], &[]);
        let engine = MoveEngine::default();
        assert!(!chosen(&engine, &b).contains(&Direction::Down));
    }

    #[test]
    fn vertical_hazard_flags_occupied_sides() {
        // Body above and to the left.
        let b = board(10, 10, &[(5, 5), (4, 5), (4, 4), (5, 4)], &[]);
        let engine = MoveEngine::default();
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Left));
        assert!(danger.contains(Direction::Up));

        let seen = chosen(&engine, &b);
        assert!(!seen.contains(&Direction::Left));
        assert!(!seen.contains(&Direction::Up));
    }

    #[test]
    fn curl_check_blocks_right_under_a_vertical_hazard() {
        let b = board(10, 10, &[(5, 5)], &[&[(5, 6), (6, 6), (6, 5)]]);
        let engine = MoveEngine::default();
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Down));
        assert!(danger.contains(Direction::Right));
        assert!(!chosen(&engine, &b).contains(&Direction::Right));
    }

    #[test]
    fn curl_check_at_the_edge_does_not_read_off_board() {
        // Head on the right edge with a vertical hazard: the right-hand neighbour is off board.
        let b = board(5, 5, &[(4, 0)], &[]);
        let engine = MoveEngine::default();
        let danger = danger_of(&engine, &b);
        assert!(danger.contains(Direction::Up));
        assert!(danger.contains(Direction::Right));
        assert!(!danger.contains(Direction::Left));
        assert!(!danger.contains(Direction::Down));
    }

    #[test]
    fn boxed_in_head_still_returns_a_forced_move() {
        let b = board(
            10,
            10,
            &[(5, 5)],
            &[&[(4, 5)], &[(6, 5)], &[(5, 4)], &[(5, 6)]],
        );
        let engine = MoveEngine::default();
        let mut rng = StdRng::seed_from_u64(7);
        let decision = engine.decide(&b, &mut rng);
        assert!(decision.forced);
        assert!(decision.danger.is_full());
        // Nothing free on board, so the first on-board direction wins.
        assert_eq!(decision.direction, Direction::Up);
    }

    #[test]
    fn forced_move_prefers_a_free_cell_inside_the_buffer() {
        // 3x3 board: every direction is inside the buffer, only Down is occupied.
        let b = board(3, 3, &[(1, 1)], &[&[(1, 2)]]);
        let engine = MoveEngine::default();
        let mut rng = StdRng::seed_from_u64(1);
        let decision = engine.decide(&b, &mut rng);
        assert!(decision.forced);
        assert_eq!(decision.direction, Direction::Up);

        let b = board(3, 3, &[(1, 1)], &[&[(1, 0)], &[(1, 2)]]);
        assert_eq!(engine.decide(&b, &mut rng).direction, Direction::Left);
    }

    #[test]
    fn forced_move_on_a_single_cell_board() {
        let b = board(1, 1, &[(0, 0)], &[]);
        let decision = MoveEngine::default().decide(&b, &mut StdRng::seed_from_u64(3));
        assert!(decision.forced);
        assert_eq!(decision.direction, Direction::Up);
    }

    #[test]
    fn decide_wrapper_returns_a_canonical_direction() {
        let b = board(11, 11, &[(5, 5), (5, 6)], &[&[(2, 2), (2, 3)]]);
        for _ in 0..50 {
            let d = decide(&b);
            assert!(Direction::all().contains(&d));
            assert_ne!(d, Direction::Down);
        }
    }

    #[test]
    fn board_rejects_bad_geometry() {
        let me = Snake::from_points("me", 50, &[(3, 3)]);
        assert_eq!(
            Board::new(0, 5, vec![], me.clone()),
            Err(BoardError::Dimensions { width: 0, height: 5 })
        );

        let stray = Snake::from_points("stray", 50, &[(2, 2), (2, 5)]);
        assert!(matches!(
            Board::new(5, 5, vec![stray], me.clone()),
            Err(BoardError::OutOfBounds { segment: 1, .. })
        ));

        let empty = Snake::new("ghost", 50, vec![]).unwrap();
        assert!(matches!(
            Board::new(5, 5, vec![], empty),
            Err(BoardError::EmptyBody { .. })
        ));

        assert!(matches!(
            Snake::new("greedy", 101, vec![Coord::new(0, 0)]),
            Err(BoardError::Health { health: 101, .. })
        ));
    }

    #[test]
    fn oversized_board_is_rejected_before_the_grid_is_built() {
        let me = Snake::from_points("me", 50, &[(3, 3)]);
        assert_eq!(
            Board::new(65536, 65536, vec![me.clone()], me.clone()),
            Err(BoardError::TooLarge {
                width: 65536,
                height: 65536,
                max: MAX_BOARD_DIM,
            })
        );
        assert!(matches!(
            Board::new(10, MAX_BOARD_DIM + 1, vec![], me.clone()),
            Err(BoardError::TooLarge { .. })
        ));

        let b = board(MAX_BOARD_DIM, MAX_BOARD_DIM, &[(24, 24)], &[]);
        let decision = MoveEngine::default().decide(&b, &mut StdRng::seed_from_u64(5));
        assert!(matches!(decision.direction, Direction::Up | Direction::Left));
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"left\"");
        assert_eq!(Direction::Right.to_string(), "right");
    }

    #[test]
    fn danger_set_display_and_complement() {
        let mut set = DangerSet::empty();
        set.insert(Direction::Right);
        set.insert(Direction::Up);
        set.insert(Direction::Right);
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "[up, right]");
        assert_eq!(
            set.complement().as_slice(),
            &[Direction::Down, Direction::Left]
        );
    }
}
