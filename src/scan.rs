//! Header capture and lazy row-stream composition.

use async_stream::try_stream;
use futures_core::Stream;
use tokio::io::AsyncRead;

use crate::{
    decode::{DecodeError, Unpacker},
    error::Error,
    value::Value,
};

/// One decoded data row: an ordered, fixed-arity sequence of scalars.
/// Position is the only addressing mechanism.
pub type Row = Vec<Value>;

/// Lazily decode `reader` into data rows.
///
/// Every top-level value must be array-shaped; the first array is the
/// header and is consumed without being forwarded, every later one is
/// yielded in encounter order. The stream ends at clean EOF and terminates
/// with the error on any decode fault.
pub fn scan_rows<R>(reader: R) -> impl Stream<Item = Result<Row, Error>> + Send
where
    R: AsyncRead + Unpin + Send,
{
    try_stream! {
        let mut unpacker = Unpacker::new(reader);
        let mut header_seen = false;
        while let Some(value) = unpacker.read_value().await? {
            let row = expect_row(value)?;
            if !header_seen {
                header_seen = true;
                continue;
            }
            yield row;
        }
    }
}

fn expect_row(value: Value) -> Result<Row, DecodeError> {
    match value {
        Value::List(row) => Ok(row),
        other => Err(DecodeError::TopLevelNotArray(other.kind())),
    }
}
