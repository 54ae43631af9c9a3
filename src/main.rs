use colored::Colorize;
use gridsolve::{solve, solve_parallel, Board};
use std::{env, fs};

fn main() {
    env_logger::init();
    let mut parallel = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--parallel" => parallel = true,
            _ => path = Some(arg),
        }
    }
    let path = path.expect("No problem file given.");
    let text =
        fs::read_to_string(&path).unwrap_or_else(|err| panic!("Cannot read {path}: {err}"));
    match Board::parse(&text) {
        Ok(board) => {
            println!("Input:\n{board}");
            let result = if parallel {
                solve_parallel(board)
            } else {
                solve(board)
            };
            match result {
                Ok(solution) => {
                    println!("Solution:\n{solution}");
                }
                Err(err) => {
                    println!("{}", format!("{err}").red());
                }
            }
        }
        Err(err) => {
            println!("{}", format!("{err}").red());
        }
    }
}
