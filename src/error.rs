//! Error types of the toolkit
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("the number of samples do not match: {0} - {1}")]
    MismatchedShapes(usize, usize),
    #[error("invalid tree structure: {0}")]
    InvalidTree(String),
}
