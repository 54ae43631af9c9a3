mod board;
mod solver;

pub use board::{Board, Options, ParseError, PlaceError};
pub use solver::{solve, solve_parallel, Unsolvable};
