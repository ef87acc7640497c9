//! Errors raised while parsing or solving a puzzle.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    /// A token or line did not have the expected shape. `line` is 1-based.
    #[error("malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("grid row at line {line} is {found} wide, expected {expected}")]
    RaggedGrid { line: usize, expected: usize, found: usize },
    #[error("input has no {0}")]
    Missing(&'static str),
    /// A search went deeper than the grid has cells.
    #[error("search exceeded depth limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    /// Input the solution deliberately does not handle, rather than guessing an answer.
    #[error("unsupported input: {0}")]
    Unsupported(String),
    #[error("could not write trace: {0}")]
    Trace(#[from] std::io::Error),
}

pub type Result<T, E = PuzzleError> = std::result::Result<T, E>;

impl PuzzleError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        PuzzleError::Malformed { line, reason: reason.into() }
    }
}

/// Parses `token` found on 1-based `line`.
pub fn parse_at<T>(token: &str, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    token.trim().parse().map_err(|e| PuzzleError::malformed(line, format!("{:?}: {}", token, e)))
}
