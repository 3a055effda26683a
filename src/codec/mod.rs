//! Codec Module
//!
//! The boundary between records and their on-disk bytes.
//!
//! ## Responsibilities
//! - `encode`: record → bytes, called once per save
//! - `decode`: bytes → record, called on every cache miss and scan
//!
//! The store never inspects the bytes; any format works as long as
//! `decode(encode(r))` yields the same fields as `r`.

mod json;

use std::fmt;

use crate::error::Result;
use crate::record::Record;

pub use json::JsonCodec;

/// Encode/decode pair used by the persistent record store
pub trait Codec: Send + Sync + fmt::Debug {
    /// Serialize a record to bytes
    fn encode(&self, record: &Record) -> Result<Vec<u8>>;

    /// Deserialize a record from bytes
    fn decode(&self, bytes: &[u8]) -> Result<Record>;
}

/// Codec assembled from two closures
///
/// ```rust,ignore
/// let codec = FnCodec::new(
///     |record| Ok(my_format::to_vec(record)),
///     |bytes| my_format::from_slice(bytes),
/// );
/// ```
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

impl<E, D> FnCodec<E, D>
where
    E: Fn(&Record) -> Result<Vec<u8>> + Send + Sync,
    D: Fn(&[u8]) -> Result<Record> + Send + Sync,
{
    pub fn new(encode: E, decode: D) -> Self {
        Self { encode, decode }
    }
}

impl<E, D> Codec for FnCodec<E, D>
where
    E: Fn(&Record) -> Result<Vec<u8>> + Send + Sync,
    D: Fn(&[u8]) -> Result<Record> + Send + Sync,
{
    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        (self.encode)(record)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        (self.decode)(bytes)
    }
}

impl<E, D> fmt::Debug for FnCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCodec")
    }
}
