/*
    Breadth-first searches over sentential forms and parser configurations
*/

pub mod derivation;
pub mod shift_reduce;

use std::fmt::Display;

use crate::error_handling::ErrorType;

#[derive(Debug, PartialEq, Clone)]
pub enum SearchErrorType {
    // Every reachable state was explored without finding the target
    Unreachable,
    // The search stopped at its bound after exploring this many states. The
    // target may still be reachable beyond it.
    BoundReached(usize),
}

impl ErrorType for SearchErrorType {}

impl Display for SearchErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchErrorType::Unreachable => write!(f, "The string cannot be produced by the grammar"),
            SearchErrorType::BoundReached(explored) => {
                write!(f, "No path found within the search bound ({} states explored)", explored)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchErrorType>;
