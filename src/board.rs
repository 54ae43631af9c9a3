use itertools::Itertools;
use std::fmt;
use thiserror::Error;

const N: usize = 9;
const BLOCK: usize = 3;
const SEPARATOR: &str = "------+-------+------";

/// Digits still assignable to a cell, as a bitmask over `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options(u16);

impl Options {
    const ALL: u16 = 0b1_1111_1111;

    fn all() -> Self {
        Self(Self::ALL)
    }

    fn none() -> Self {
        Self(0)
    }

    fn remove(&mut self, value: u8) {
        self.0 &= !(1 << (value - 1));
    }

    pub fn contains(self, value: u8) -> bool {
        self.0 & (1 << (value - 1)) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Candidates in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=9).filter(move |&value| self.contains(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("Cell ({x}, {y}) is already filled")]
    Occupied { x: usize, y: usize },
    #[error("Value {value} is already in row {y}")]
    DuplicateInRow { value: u8, y: usize },
    #[error("Value {value} is already in column {x}")]
    DuplicateInColumn { value: u8, x: usize },
    #[error("Value {value} is already in block ({bx}, {by})")]
    DuplicateInBlock { value: u8, bx: usize, by: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid token {token:?} in row {y}")]
    InvalidToken { token: String, y: usize },
    #[error("Value {value} in row {y} is out of range")]
    OutOfRange { value: u32, y: usize },
    #[error("Too many rows, expected at most 9")]
    TooManyRows,
    #[error("Too many values in row {y}, expected at most 9")]
    TooManyColumns { y: usize },
    #[error("Conflicting clue at ({x}, {y}): {source}")]
    Conflict {
        x: usize,
        y: usize,
        #[source]
        source: PlaceError,
    },
}

fn row_coords(y: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..N).map(move |x| (x, y))
}

fn col_coords(x: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..N).map(move |y| (x, y))
}

fn block_coords(x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    let bx = x / BLOCK * BLOCK;
    let by = y / BLOCK * BLOCK;
    (bx..bx + BLOCK).cartesian_product(by..by + BLOCK)
}

/// Row-major scan over the whole grid: row 0 columns 0..9, then row 1, ...
fn cell_coords() -> impl Iterator<Item = (usize, usize)> {
    (0..N).cartesian_product(0..N).map(|(y, x)| (x, y))
}

/// A 9x9 grid of filled values plus, for every cell, the set of digits
/// still assignable to it. The option sets are pruned incrementally on
/// every placement, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    values: [[u8; N]; N],
    options: [[Options; N]; N],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            values: [[0; N]; N],
            options: [[Options::all(); N]; N],
        }
    }

    /// Parses whitespace-separated rows of digits, 0 for a blank cell.
    /// Also accepts the pretty form produced by `Display`: `|` tokens and
    /// `---+---` separator lines are skipped before tokenizing.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut board = Self::new();
        let lines = text
            .trim()
            .lines()
            .filter(|line| !is_separator_line(line));
        for (y, line) in lines.enumerate() {
            if y >= N {
                return Err(ParseError::TooManyRows);
            }
            let tokens = line.split_whitespace().filter(|token| *token != "|");
            for (x, token) in tokens.enumerate() {
                if x >= N {
                    return Err(ParseError::TooManyColumns { y });
                }
                let value: u32 = token.parse().map_err(|_| ParseError::InvalidToken {
                    token: token.to_string(),
                    y,
                })?;
                if value > 9 {
                    return Err(ParseError::OutOfRange { value, y });
                }
                if value == 0 {
                    continue;
                }
                board
                    .place(x, y, value as u8)
                    .map_err(|source| ParseError::Conflict { x, y, source })?;
            }
        }
        Ok(board)
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.values[y][x]
    }

    pub fn get_options(&self, x: usize, y: usize) -> Options {
        self.options[y][x]
    }

    /// The one mutator. Writes `value` into the cell and removes it from
    /// the option sets of every other cell in the same row, column and
    /// block. Fails without touching the board if the cell is occupied or
    /// the value already appears in one of the three groups.
    pub fn place(&mut self, x: usize, y: usize, value: u8) -> Result<(), PlaceError> {
        debug_assert!((1..=9).contains(&value));
        if self.get(x, y) != 0 {
            return Err(PlaceError::Occupied { x, y });
        }
        if row_coords(y).any(|(x, y)| self.get(x, y) == value) {
            return Err(PlaceError::DuplicateInRow { value, y });
        }
        if col_coords(x).any(|(x, y)| self.get(x, y) == value) {
            return Err(PlaceError::DuplicateInColumn { value, x });
        }
        if block_coords(x, y).any(|(x, y)| self.get(x, y) == value) {
            return Err(PlaceError::DuplicateInBlock {
                value,
                bx: x / BLOCK * BLOCK,
                by: y / BLOCK * BLOCK,
            });
        }

        self.values[y][x] = value;
        self.options[y][x] = Options::none();
        for (x, y) in row_coords(y).chain(col_coords(x)).chain(block_coords(x, y)) {
            self.options[y][x].remove(value);
        }
        Ok(())
    }

    /// Empty cells in row-major scan order.
    pub fn empty_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        cell_coords().filter(move |&(x, y)| self.get(x, y) == 0)
    }

    pub fn is_solved(&self) -> bool {
        cell_coords().all(|(x, y)| self.get(x, y) != 0)
    }

    /// Cheap dead-end check: every empty cell still has at least one
    /// option. Necessary but not sufficient for an actual solution to
    /// exist.
    pub fn is_solvable(&self) -> bool {
        self.empty_coords().all(|(x, y)| !self.get_options(x, y).is_empty())
    }
}

fn is_separator_line(line: &str) -> bool {
    !line.trim().is_empty()
        && line
            .chars()
            .all(|c| c == '-' || c == '+' || c.is_whitespace())
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::with_capacity(11);
        for (block, rows) in self.values.chunks(BLOCK).enumerate() {
            if block != 0 {
                out.push(SEPARATOR.to_string());
            }
            for row in rows {
                let line = row
                    .chunks(BLOCK)
                    .map(|group| {
                        group
                            .iter()
                            .map(|&value| {
                                if value == 0 {
                                    ' '
                                } else {
                                    (b'0' + value) as char
                                }
                            })
                            .join(" ")
                    })
                    .join(" | ");
                out.push(line);
            }
        }
        write!(f, "{}", out.join("\n"))
    }
}
