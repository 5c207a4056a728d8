//! Error taxonomy.
//!
//! Registration errors surface from `query`. Resolution errors are scoped to a
//! single record during evaluation: the engine logs them and moves on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CqError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("element has no parent")]
    MissingParent,

    #[error("malformed length `{0}`")]
    MalformedLength(String),

    #[error("unknown element: {0}")]
    UnknownElement(String),

    #[error("layout error: {0}")]
    Layout(String),
}

pub type Result<T> = std::result::Result<T, CqError>;
