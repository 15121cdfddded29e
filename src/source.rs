//! Host-facing row-source surface.
//!
//! The host engine touches exactly two operations: configure a source once
//! from its option map, then open one scan session per query with the
//! pushed-down quals and the declared column mapping. Everything else in
//! this crate hangs off those two calls.

use std::{collections::HashMap, path::PathBuf};

use async_stream::try_stream;
use futures_core::Stream;
use tokio::{
    fs::File,
    io::{AsyncRead, BufReader},
};

use crate::{
    error::Error,
    predicate::{CompiledPredicates, Qual},
    scan::{scan_rows, Row},
};

/// A source of filtered rows the host engine can drive.
pub trait RowSource {
    /// Open an independent scan session: rows satisfying every qual, in
    /// source order, lazily. Dropping the stream releases the underlying
    /// resource.
    fn open(
        &self,
        quals: &[Qual],
        columns: &[String],
    ) -> impl Stream<Item = Result<Row, Error>> + Send;
}

/// A msgpack partition file exposed as a filtered row source.
#[derive(Debug, Clone)]
pub struct PartitionSource {
    filename: PathBuf,
}

impl PartitionSource {
    /// Required option naming the partition file.
    pub const FILENAME_OPTION: &'static str = "filename";

    /// Build a source from the host's option map. `filename` is required;
    /// its absence fails here, at configure time, not at first read.
    pub fn configure(options: &HashMap<String, String>) -> Result<Self, Error> {
        let filename = options
            .get(Self::FILENAME_OPTION)
            .ok_or(Error::MissingOption(Self::FILENAME_OPTION))?;
        Ok(Self {
            filename: PathBuf::from(filename),
        })
    }

    /// The configured partition file path.
    pub fn filename(&self) -> &std::path::Path {
        &self.filename
    }
}

impl RowSource for PartitionSource {
    fn open(
        &self,
        quals: &[Qual],
        columns: &[String],
    ) -> impl Stream<Item = Result<Row, Error>> + Send {
        let filename = self.filename.clone();
        let compiled = CompiledPredicates::compile(quals, columns);
        try_stream! {
            let compiled = compiled?;
            let file = File::open(&filename).await?;
            let rows = filtered_rows(BufReader::new(file), compiled);
            for await row in rows {
                yield row?;
            }
        }
    }
}

/// Run the same scan/filter pipeline over a caller-supplied byte source.
///
/// This is the layering seam for compression: the decoder only needs read
/// semantics, so the host can hand in a gzip (or any other) decompression
/// adapter and nothing downstream changes.
pub fn open_reader<R>(
    reader: R,
    quals: &[Qual],
    columns: &[String],
) -> impl Stream<Item = Result<Row, Error>> + Send
where
    R: AsyncRead + Unpin + Send,
{
    let compiled = CompiledPredicates::compile(quals, columns);
    try_stream! {
        let compiled = compiled?;
        for await row in filtered_rows(reader, compiled) {
            yield row?;
        }
    }
}

fn filtered_rows<R>(
    reader: R,
    compiled: CompiledPredicates,
) -> impl Stream<Item = Result<Row, Error>> + Send
where
    R: AsyncRead + Unpin + Send,
{
    try_stream! {
        for await row in scan_rows(reader) {
            let row = row?;
            if compiled.matches(&row) {
                yield row;
            }
        }
    }
}
