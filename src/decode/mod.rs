//! Streaming msgpack unpacker.
//!
//! [`Unpacker`] pulls one top-level value at a time off an [`AsyncRead`],
//! so a partition never has to reside in memory at once. Every map the
//! stream contains is handed to the extension hook in [`ext`] and comes
//! back as a date, time or datetime scalar; maps never surface as values.

mod ext;

use std::{future::Future, io, pin::Pin};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::value::Value;

/// Faults that abort decoding. There is no partial-row recovery: one
/// corrupt value terminates the whole read.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte source failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The source ended inside a value.
    #[error("unexpected end of stream inside a value")]
    UnexpectedEof,
    /// A format byte this decoder does not handle (ext families and the
    /// reserved byte `0xc1`).
    #[error("unsupported msgpack format byte 0x{0:02x}")]
    UnsupportedFormat(u8),
    /// A string payload was not valid UTF-8.
    #[error("invalid utf-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// A top-level value was not array-shaped.
    #[error("top-level value must be an array, got {0}")]
    TopLevelNotArray(&'static str),
    /// A map carried none of the known extension markers.
    #[error("unknown extension map on decode, keys: {0:?}")]
    UnknownExtension(Vec<String>),
    /// An extension map had no string payload under `as_str`.
    #[error("extension map has no string `as_str` entry")]
    MissingPayload,
    /// An extension payload did not parse under any accepted format.
    #[error("cannot parse `{value}` as {kind}")]
    BadTemporal {
        /// Which temporal shape was being reconstructed.
        kind: &'static str,
        /// The offending payload.
        value: String,
    },
}

fn truncation(err: io::Error) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof
    } else {
        DecodeError::Io(err)
    }
}

/// Incremental msgpack decoder over an async byte source.
///
/// The reader is exclusively owned for the lifetime of the unpacker; one
/// session never shares a byte cursor with another.
pub struct Unpacker<R> {
    reader: R,
}

impl<R> Unpacker<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Wrap a byte source. Callers that read from a file should layer a
    /// buffered reader underneath; decoding reads small chunks.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Decode the next top-level value.
    ///
    /// Returns `Ok(None)` on a clean end of stream at a value boundary;
    /// running out of bytes anywhere else is [`DecodeError::UnexpectedEof`].
    pub async fn read_value(&mut self) -> Result<Option<Value>, DecodeError> {
        let mut marker = [0u8; 1];
        match self.reader.read(&mut marker).await {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            Err(err) => return Err(DecodeError::Io(err)),
        }
        self.decode_value(marker[0]).await.map(Some)
    }

    fn decode_value(
        &mut self,
        marker: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Value, DecodeError>> + Send + '_>> {
        Box::pin(async move {
            let value = match marker {
                0x00..=0x7f => Value::Int(i64::from(marker)),
                0x80..=0x8f => self.decode_map(usize::from(marker & 0x0f)).await?,
                0x90..=0x9f => self.decode_array(usize::from(marker & 0x0f)).await?,
                0xa0..=0xbf => self.decode_str(usize::from(marker & 0x1f)).await?,
                0xc0 => Value::Null,
                0xc2 => Value::Boolean(false),
                0xc3 => Value::Boolean(true),
                0xc4 => {
                    let len = usize::from(self.read_u8().await?);
                    self.decode_bin(len).await?
                }
                0xc5 => {
                    let len = usize::from(self.read_u16().await?);
                    self.decode_bin(len).await?
                }
                0xc6 => {
                    let len = self.read_u32().await? as usize;
                    self.decode_bin(len).await?
                }
                0xca => {
                    let raw = self.read_array::<4>().await?;
                    Value::Float(f64::from(f32::from_be_bytes(raw)))
                }
                0xcb => Value::Float(f64::from_be_bytes(self.read_array::<8>().await?)),
                0xcc => Value::Int(i64::from(self.read_u8().await?)),
                0xcd => Value::Int(i64::from(self.read_u16().await?)),
                0xce => Value::Int(i64::from(self.read_u32().await?)),
                0xcf => {
                    let raw = u64::from_be_bytes(self.read_array::<8>().await?);
                    match i64::try_from(raw) {
                        Ok(v) => Value::Int(v),
                        Err(_) => Value::UInt(raw),
                    }
                }
                0xd0 => Value::Int(i64::from(self.read_u8().await? as i8)),
                0xd1 => Value::Int(i64::from(i16::from_be_bytes(
                    self.read_array::<2>().await?,
                ))),
                0xd2 => Value::Int(i64::from(i32::from_be_bytes(
                    self.read_array::<4>().await?,
                ))),
                0xd3 => Value::Int(i64::from_be_bytes(self.read_array::<8>().await?)),
                0xd9 => {
                    let len = usize::from(self.read_u8().await?);
                    self.decode_str(len).await?
                }
                0xda => {
                    let len = usize::from(self.read_u16().await?);
                    self.decode_str(len).await?
                }
                0xdb => {
                    let len = self.read_u32().await? as usize;
                    self.decode_str(len).await?
                }
                0xdc => {
                    let len = usize::from(self.read_u16().await?);
                    self.decode_array(len).await?
                }
                0xdd => {
                    let len = self.read_u32().await? as usize;
                    self.decode_array(len).await?
                }
                0xde => {
                    let len = usize::from(self.read_u16().await?);
                    self.decode_map(len).await?
                }
                0xdf => {
                    let len = self.read_u32().await? as usize;
                    self.decode_map(len).await?
                }
                0xe0..=0xff => Value::Int(i64::from(marker as i8)),
                other => return Err(DecodeError::UnsupportedFormat(other)),
            };

            Ok(value)
        })
    }

    async fn decode_array(&mut self, len: usize) -> Result<Value, DecodeError> {
        // Capacity is clamped so a corrupt length prefix cannot force a
        // huge allocation before the elements fail to decode.
        let mut items = Vec::with_capacity(len.min(1 << 10));
        for _ in 0..len {
            let marker = self.read_u8().await?;
            items.push(self.decode_value(marker).await?);
        }
        Ok(Value::List(items))
    }

    async fn decode_map(&mut self, len: usize) -> Result<Value, DecodeError> {
        let mut entries = Vec::with_capacity(len.min(1 << 10));
        for _ in 0..len {
            let marker = self.read_u8().await?;
            let key = self.decode_value(marker).await?;
            let marker = self.read_u8().await?;
            let value = self.decode_value(marker).await?;
            entries.push((key, value));
        }
        ext::classify(entries)
    }

    async fn decode_str(&mut self, len: usize) -> Result<Value, DecodeError> {
        let buf = self.read_payload(len).await?;
        Ok(Value::String(String::from_utf8(buf)?))
    }

    async fn decode_bin(&mut self, len: usize) -> Result<Value, DecodeError> {
        let buf = self.read_payload(len).await?;
        Ok(Value::Binary(buf))
    }

    // Payloads are filled in bounded chunks so a corrupt length prefix
    // cannot force a multi-gigabyte allocation before the bytes fail to
    // arrive; same guard as the container capacity clamp above.
    async fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        const CHUNK: usize = 1 << 16;

        let mut buf = Vec::with_capacity(len.min(CHUNK));
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(CHUNK);
            let start = buf.len();
            buf.resize(start + chunk, 0);
            self.reader
                .read_exact(&mut buf[start..])
                .await
                .map_err(truncation)?;
            remaining -= chunk;
        }
        Ok(buf)
    }

    async fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf).await.map_err(truncation)?;
        Ok(buf)
    }

    async fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>().await?[0])
    }

    async fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_array::<2>().await?))
    }

    async fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array::<4>().await?))
    }
}
