//! Manifest errors

use crate::model::PathProblem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("line {line}: expected `#define NAME(PARAM) \\` header")]
    MissingHeader { line: usize },

    #[error("line {line}: malformed row: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("line {line}: row follows a line without a `\\` continuation")]
    RowAfterEnd { line: usize },

    #[error("`{name}({param})` is not a valid macro header")]
    InvalidHeader { name: String, param: String },

    #[error("row {row}: `{symbol}` is not a valid identifier")]
    InvalidSymbol { row: usize, symbol: String },

    #[error("row {row}: symbol `{symbol}` already defined at row {first}")]
    DuplicateSymbol {
        row: usize,
        first: usize,
        symbol: String,
    },

    #[error("row {row}: invalid path `{path}`: {problem}")]
    InvalidPath {
        row: usize,
        path: String,
        problem: PathProblem,
    },

    #[error("expected {expected} entries, found {found}")]
    CountMismatch { expected: usize, found: usize },
}
