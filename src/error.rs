use thiserror::Error;

/// Errors that can surface from the core or its collaborators.
///
/// The proof-search core never panics on malformed *graph* input (cycles are
/// repaired with a warning, see `dag::Dag::build`). These variants are for
/// the cases spec.md §7 calls out as genuine failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DoverifyError {
    /// `find_proof` was given something that is neither a single term nor an
    /// `A - B` difference of two terms.
    #[error("unsupported expression shape for proof search")]
    UnsupportedExpression,

    /// An ATE-style difference had an operand that isn't a term.
    #[error("type error in ATE expression: {detail}")]
    TypeError { detail: String },

    /// The surface-syntax parser (a non-core collaborator) failed.
    #[error("could not parse expression: {detail}")]
    Parse { detail: String },
}

pub type Result<T> = std::result::Result<T, DoverifyError>;
