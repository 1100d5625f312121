use crate::grid::{Cell, Direction};
use log::{debug, info};
use rand::{rngs::StdRng, seq::IteratorRandom, Rng, SeedableRng};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;

pub const MIN_BOARD_SIZE: u16 = 3;
pub const MAX_BOARD_SIZE: u16 = 256;
pub const DEFAULT_BOARD_SIZE: u16 = 20;

/// Uniform draws tried before falling back to enumerating free cells.
const MAX_FOOD_ATTEMPTS: usize = 64;
const INITIAL_HEAD: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub board_size: u16,
    /// Fixed seed for reproducible food placement. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            board_size: DEFAULT_BOARD_SIZE,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn new(board_size: u16) -> Self {
        SimConfig {
            board_size,
            ..Default::default()
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        SimConfig {
            seed: Some(seed),
            ..self
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall(self.board_size));
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooLarge(self.board_size));
        }
        Ok(())
    }

    fn cell_count(&self) -> usize {
        self.board_size as usize * self.board_size as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    BoardTooSmall(u16),
    BoardTooLarge(u16),
    EmptySnake,
    CellOffBoard(Cell),
    /// A layout placed two things on the same cell.
    OverlappingCell(Cell),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BoardTooSmall(n) => {
                write!(f, "board size {} is below the minimum of {}", n, MIN_BOARD_SIZE)
            }
            ConfigError::BoardTooLarge(n) => {
                write!(f, "board size {} is above the maximum of {}", n, MAX_BOARD_SIZE)
            }
            ConfigError::EmptySnake => write!(f, "snake layout has no cells"),
            ConfigError::CellOffBoard(cell) => {
                write!(f, "cell ({}, {}) is outside the board", cell.x, cell.y)
            }
            ConfigError::OverlappingCell(cell) => {
                write!(f, "cell ({}, {}) is occupied twice", cell.x, cell.y)
            }
        }
    }
}

impl Error for ConfigError {}

/// Why a simulation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    HitWall,
    HitSelf,
    /// The snake covers every cell, so no food can be placed.
    BoardFilled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Moved,
    Grew,
    Ended(Outcome),
    /// Stepped after the game had already ended; nothing changed.
    Idle,
}

/// Owned copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board_size: u16,
    /// Head first.
    pub snake: Vec<Cell>,
    pub food: Option<Cell>,
    pub score: u32,
    pub heading: Direction,
    pub outcome: Option<Outcome>,
    pub ticks: u64,
}

impl Snapshot {
    pub fn game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }
}

/// Snake on a square board, advanced one cell per [`step`](Self::step).
///
/// The body is a ring buffer sized for the whole board so moving never
/// reallocates, and an occupancy bitmap mirrors it for constant-time
/// collision checks and free-cell enumeration.
#[derive(Debug)]
pub struct GridSimulation {
    config: SimConfig,
    rng: StdRng,
    snake: VecDeque<Cell>,
    occupied: Vec<bool>,
    heading: Direction,
    pending_turn: Option<Direction>,
    food: Option<Cell>,
    score: u32,
    outcome: Option<Outcome>,
    ticks: u64,
}

impl GridSimulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let mut sim = Self::empty(config)?;
        sim.reset();
        Ok(sim)
    }

    /// Starts from an explicit layout instead of the opening position.
    ///
    /// `snake` is head first. Contiguity of the body is not checked. A later
    /// [`reset`](Self::reset) returns to the regular opening position.
    pub fn with_layout(
        config: SimConfig,
        snake: impl IntoIterator<Item = Cell>,
        heading: Direction,
        food: Cell,
    ) -> Result<Self, ConfigError> {
        let mut sim = Self::empty(config)?;
        for cell in snake {
            sim.check_on_board(cell)?;
            if sim.is_occupied(cell) {
                return Err(ConfigError::OverlappingCell(cell));
            }
            sim.push_tail(cell);
        }
        if sim.snake.is_empty() {
            return Err(ConfigError::EmptySnake);
        }
        sim.check_on_board(food)?;
        if sim.is_occupied(food) {
            return Err(ConfigError::OverlappingCell(food));
        }
        sim.heading = heading;
        sim.food = Some(food);
        Ok(sim)
    }

    fn empty(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(GridSimulation {
            config,
            rng,
            snake: VecDeque::with_capacity(config.cell_count()),
            occupied: vec![false; config.cell_count()],
            heading: Direction::Right,
            pending_turn: None,
            food: None,
            score: 0,
            outcome: None,
            ticks: 0,
        })
    }

    /// Back to the opening position: three cells heading right, no score,
    /// fresh food. The RNG stream carries on, it is not reseeded.
    pub fn reset(&mut self) {
        self.snake.clear();
        self.occupied.fill(false);
        for cell in opening_snake(self.config.board_size) {
            self.push_tail(cell);
        }
        self.heading = Direction::Right;
        self.pending_turn = None;
        self.score = 0;
        self.outcome = None;
        self.ticks = 0;
        self.food = self.spawn_food();

        info!(
            "New game on {0}x{0} board, food at {1:?}",
            self.config.board_size, self.food
        );
    }

    /// Buffers a turn for the next step. Reversals and requests made after
    /// the game ended are dropped; otherwise the latest request wins.
    pub fn request_turn(&mut self, direction: Direction) {
        if self.game_over() || direction == self.heading.opposite() {
            return;
        }
        self.pending_turn = Some(direction);
    }

    pub fn step(&mut self) -> StepResult {
        if self.game_over() {
            return StepResult::Idle;
        }

        // Only validated turns reach the buffer, and the heading cannot
        // change between buffering and here.
        if let Some(turn) = self.pending_turn.take() {
            self.heading = turn;
        }
        self.ticks += 1;

        let Some(new_head) = self
            .head()
            .checked_add(self.heading.delta(), self.config.board_size)
        else {
            return self.finish(Outcome::HitWall);
        };

        // The tail has not moved yet, so following it into its own cell
        // counts as a collision.
        if self.is_occupied(new_head) {
            return self.finish(Outcome::HitSelf);
        }

        self.push_head(new_head);

        if self.food == Some(new_head) {
            self.score += 1;
            self.food = self.spawn_food();
            match self.food {
                Some(food) => {
                    debug!(
                        "Ate at {:?}, score {}, food now at {:?}",
                        new_head, self.score, food
                    );
                    StepResult::Grew
                }
                None => self.finish(Outcome::BoardFilled),
            }
        } else {
            self.pop_tail();
            StepResult::Moved
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board_size: self.config.board_size,
            snake: self.snake.iter().copied().collect(),
            food: self.food,
            score: self.score,
            heading: self.heading,
            outcome: self.outcome,
            ticks: self.ticks,
        }
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    pub fn board_size(&self) -> u16 {
        self.config.board_size
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn pending_turn(&self) -> Option<Direction> {
        self.pending_turn
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }

    /// Body cells, head first.
    pub fn snake(&self) -> impl Iterator<Item = Cell> + '_ {
        self.snake.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        let n = self.config.board_size;
        cell.x < n && cell.y < n && self.occupied[cell.index(n)]
    }

    fn finish(&mut self, outcome: Outcome) -> StepResult {
        self.outcome = Some(outcome);
        info!(
            "Game over ({:?}) after {} ticks, length {}, score {}",
            outcome,
            self.ticks,
            self.snake.len(),
            self.score
        );
        StepResult::Ended(outcome)
    }

    fn check_on_board(&self, cell: Cell) -> Result<(), ConfigError> {
        let n = self.config.board_size;
        if cell.x < n && cell.y < n {
            Ok(())
        } else {
            Err(ConfigError::CellOffBoard(cell))
        }
    }

    fn push_head(&mut self, cell: Cell) {
        self.occupied[cell.index(self.config.board_size)] = true;
        self.snake.push_front(cell);
    }

    fn push_tail(&mut self, cell: Cell) {
        self.occupied[cell.index(self.config.board_size)] = true;
        self.snake.push_back(cell);
    }

    fn pop_tail(&mut self) {
        if let Some(tail) = self.snake.pop_back() {
            self.occupied[tail.index(self.config.board_size)] = false;
        }
    }

    /// Picks a free cell uniformly at random, or `None` if the snake covers
    /// the whole board.
    fn spawn_food(&mut self) -> Option<Cell> {
        let n = self.config.board_size;
        let free = self.config.cell_count() - self.snake.len();
        if free == 0 {
            return None;
        }

        for _ in 0..MAX_FOOD_ATTEMPTS {
            let cell = Cell {
                x: self.rng.gen_range(0..n),
                y: self.rng.gen_range(0..n),
            };
            if !self.is_occupied(cell) {
                return Some(cell);
            }
        }

        debug!("Food resampling exhausted with {} free cells, enumerating", free);
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(index, _)| Cell::from_index(index, n))
            .choose(&mut self.rng)
    }
}

/// The original game's opening position, `[(5,5), (4,5), (3,5)]`, pulled in
/// from the far edge on boards too small to hold it.
fn opening_snake(board_size: u16) -> [Cell; 3] {
    let x = INITIAL_HEAD.min(board_size - 1);
    let y = INITIAL_HEAD.min(board_size - 1);
    [Cell::new(x, y), Cell::new(x - 1, y), Cell::new(x - 2, y)]
}
