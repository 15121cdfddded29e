#![deny(missing_docs)]
//! Streaming reader for msgpack-packed partition files with predicate
//! pushdown.
//!
//! A partition file is a sequence of top-level msgpack arrays: the first is
//! a header of column-name strings, every later one is a data row. Columns
//! are mapped positionally against the names the host engine declares.
//! [`PartitionSource`] opens one independent scan session per call and
//! lazily yields, in file order, the rows that satisfy the host's
//! pushed-down predicates; rows the predicates reject are never returned.
//!
//! Extended scalars (date, time, datetime) are reconstructed during decode
//! from tagged sub-maps, so rows only ever contain plain [`Value`] scalars.

/// Streaming msgpack unpacking and extension-tag reconstruction.
pub mod decode;
mod error;
mod logging;
/// Pushed-down predicate compilation and row matching.
pub mod predicate;
/// Header capture and lazy row-stream composition.
pub mod scan;
/// Host-facing row-source surface.
pub mod source;
/// Scalar values decoded from a partition stream.
pub mod value;

pub use crate::{
    error::Error,
    predicate::{CompiledPredicates, Operator, Qual},
    scan::{scan_rows, Row},
    source::{open_reader, PartitionSource, RowSource},
    value::Value,
};
