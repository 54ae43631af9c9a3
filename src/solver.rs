use crate::board::Board;
use crossbeam::channel::unbounded;
use itertools::Itertools;
use log::debug;
use std::thread;
use thiserror::Error;

/// The board, or one of its speculative branches, admits no valid
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Sudoku is unsolvable")]
pub struct Unsolvable;

enum Propagation {
    Solved,
    Stalled,
}

/// Solves the board with constraint propagation, falling back to
/// recursive trial and error when no forced move is left. Returns the
/// first solution found.
pub fn solve(mut board: Board) -> Result<Board, Unsolvable> {
    match propagate(&mut board)? {
        Propagation::Solved => Ok(board),
        Propagation::Stalled => fork(board),
    }
}

/// Same contract as [`solve`], but the candidate branches of the first
/// fork are explored on worker threads. Branches share no state, each
/// one solves its own copy of the board.
pub fn solve_parallel(mut board: Board) -> Result<Board, Unsolvable> {
    match propagate(&mut board)? {
        Propagation::Solved => Ok(board),
        Propagation::Stalled => fork_parallel(board),
    }
}

/// Applies naked singles until the board is solved or none remain. The
/// moves are recomputed after every pass since each placement can create
/// or destroy single-option cells elsewhere.
fn propagate(board: &mut Board) -> Result<Propagation, Unsolvable> {
    loop {
        if board.is_solved() {
            return Ok(Propagation::Solved);
        }
        let moves = trivial_moves(board);
        if moves.is_empty() {
            return Ok(Propagation::Stalled);
        }
        debug!("Placing {} naked singles", moves.len());
        for (x, y, value) in moves {
            if board.place(x, y, value).is_err() {
                return Err(Unsolvable);
            }
            if !board.is_solvable() {
                return Err(Unsolvable);
            }
        }
    }
}

/// Empty cells whose option set has exactly one member, with that member.
fn trivial_moves(board: &Board) -> Vec<(usize, usize, u8)> {
    board
        .empty_coords()
        .filter_map(|(x, y)| {
            let options = board.get_options(x, y);
            if options.len() == 1 {
                options.iter().next().map(|value| (x, y, value))
            } else {
                None
            }
        })
        .collect_vec()
}

/// Tries every option of the first empty cell on an independent copy of
/// the board. The first branch that solves wins; when all of them fail
/// the board itself is unsolvable.
fn fork(board: Board) -> Result<Board, Unsolvable> {
    let (x, y) = board.empty_coords().next().ok_or(Unsolvable)?;
    let options = board.get_options(x, y);
    debug!("Forking on ({x}, {y}) with {} options", options.len());
    for value in options.iter() {
        let mut attempt = board.clone();
        if attempt.place(x, y, value).is_err() {
            continue;
        }
        match solve(attempt) {
            Ok(solved) => return Ok(solved),
            Err(Unsolvable) => continue,
        }
    }
    Err(Unsolvable)
}

fn fork_parallel(board: Board) -> Result<Board, Unsolvable> {
    let (x, y) = board.empty_coords().next().ok_or(Unsolvable)?;
    let attempts = board
        .get_options(x, y)
        .iter()
        .filter_map(|value| {
            let mut attempt = board.clone();
            attempt.place(x, y, value).ok().map(|()| attempt)
        })
        .collect_vec();
    let workers = num_cpus::get().min(attempts.len());
    debug!(
        "Forking on ({x}, {y}) across {} branches on {workers} workers",
        attempts.len()
    );

    let (task_tx, task_rx) = unbounded();
    let (result_tx, result_rx) = unbounded();
    for attempt in attempts {
        task_tx.send(attempt).unwrap();
    }
    drop(task_tx);

    for id in 0..workers {
        let task_rx = task_rx.clone();
        let result_tx = result_tx.clone();
        thread::spawn(move || {
            while let Ok(attempt) = task_rx.recv() {
                debug!("[Worker {id}] Solving branch");
                if result_tx.send(solve(attempt)).is_err() {
                    break;
                }
            }
        });
    }
    drop(task_rx);
    drop(result_tx);

    while let Ok(result) = result_rx.recv() {
        if let Ok(solved) = result {
            return Ok(solved);
        }
    }
    Err(Unsolvable)
}
