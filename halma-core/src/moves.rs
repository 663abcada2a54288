//! Destination search for one turn: a single step, or a chain of jumps
//!
//! A pin may either step onto an empty neighbor, or jump over an adjacent
//! pin (of any color) onto the empty field directly behind it. Jumps chain:
//! every landing field is searched again, breadth first, so one turn can
//! cross the board. Steps never chain.

use crate::board::{Board, Position, DIRECTIONS};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Landing field for a jump from `pos` in `direction`, if the jump is open
fn jump_landing(board: &Board, pos: Position, direction: usize) -> Option<Position> {
    let over = pos.neighbor(direction);
    let landing = pos.offset(direction, 2);
    (board.is_occupied(over) && board.is_free(landing)).then_some(landing)
}

/// All fields the pin on `origin` can reach this turn.
///
/// Never contains `origin` itself, and lists every field at most once.
pub fn possible_destinations(board: &Board, origin: Position) -> Vec<Position> {
    let mut seen: FxHashSet<Position> = FxHashSet::default();
    let mut todo = VecDeque::from([origin]);
    let mut possible = Vec::new();

    // Steps are only available from the starting field
    for direction in 0..DIRECTIONS.len() {
        let step = origin.neighbor(direction);
        if board.is_free(step) {
            possible.push(step);
        }
    }

    while let Some(pos) = todo.pop_front() {
        if !seen.insert(pos) {
            continue;
        }
        if pos != origin {
            possible.push(pos);
        }

        for direction in 0..DIRECTIONS.len() {
            if let Some(landing) = jump_landing(board, pos, direction) {
                if !seen.contains(&landing) {
                    todo.push_back(landing);
                }
            }
        }
    }

    possible
}
