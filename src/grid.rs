//! Board value types: cells, headings and the arithmetic between them.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step for one tick of travel in this direction.
    pub fn delta(&self) -> CellDelta {
        (*self).into()
    }

    pub(crate) fn to_bits(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 3,
            Direction::Right => 4,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> Option<Direction> {
        match bits {
            1 => Some(Direction::Up),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            4 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A board position: column `x`, row `y`, both 0-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

impl Cell {
    pub const fn new(x: u16, y: u16) -> Self {
        Cell { x, y }
    }

    /// Moves by `delta`, returning `None` if the result falls outside a
    /// `board_size` x `board_size` board. There is no wrapping.
    pub fn checked_add(&self, delta: CellDelta, board_size: u16) -> Option<Cell> {
        let x = self.x as i32 + delta.x;
        let y = self.y as i32 + delta.y;
        let bound = board_size as i32;
        if (0..bound).contains(&x) && (0..bound).contains(&y) {
            Some(Cell {
                x: x as u16,
                y: y as u16,
            })
        } else {
            None
        }
    }

    /// Row-major index into a `board_size` wide grid.
    pub(crate) fn index(&self, board_size: u16) -> usize {
        self.y as usize * board_size as usize + self.x as usize
    }

    pub(crate) fn from_index(index: usize, board_size: u16) -> Cell {
        let n = board_size as usize;
        Cell {
            x: (index % n) as u16,
            y: (index / n) as u16,
        }
    }
}

impl From<(u16, u16)> for Cell {
    fn from((x, y): (u16, u16)) -> Self {
        Cell { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDelta {
    pub x: i32,
    pub y: i32,
}

impl From<Direction> for CellDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => CellDelta { x: 0, y: -1 },
            Direction::Down => CellDelta { x: 0, y: 1 },
            Direction::Left => CellDelta { x: -1, y: 0 },
            Direction::Right => CellDelta { x: 1, y: 0 },
        }
    }
}
