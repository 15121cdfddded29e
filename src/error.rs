use thiserror::Error;

use crate::decode::DecodeError;

/// Errors surfaced to the host engine.
///
/// Decode faults abort the whole scan session: the partition container is
/// either fully well-formed or not trustworthy at all, so there is no
/// partial-row recovery. The one deliberate soft spot, an operator symbol
/// the evaluator does not understand, is not an error at all; it is reported
/// through the logging channel and the affected predicate is skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// A required source option was not supplied at configure time.
    #[error("`{0}` is a required option of the partition source")]
    MissingOption(&'static str),
    /// The byte stream is corrupt or not a partition stream.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A predicate named a column absent from the declared mapping; the host
    /// should never request filtering on an undeclared column.
    #[error("unknown column `{0}` in pushed-down predicate")]
    UnknownField(String),
    /// A pattern operator was given a non-string literal.
    #[error("pattern operator `{0}` requires a string literal")]
    NonStringPattern(&'static str),
    /// A pattern literal did not translate to a usable matcher.
    #[error("cannot compile pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The literal pattern as the host supplied it.
        pattern: String,
        /// Underlying regex failure.
        source: regex::Error,
    },
    /// The underlying byte source failed outside of decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
