#![forbid(unsafe_code)]
//! Parses the line-oriented puzzle file format (§6) into a
//! `kenken_core::Puzzle`.

pub mod error;
pub mod format;

pub use crate::error::IoError;
pub use crate::format::{parse_puzzle, read_puzzle_file};
