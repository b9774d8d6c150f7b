use std::io;

use kenken_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("Malformed constraint in input file")]
    MalformedConstraint,

    #[error("Failed to read line from input file")]
    Read(#[source] io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
