//! JSON codec (default)

use crate::error::{FsdbError, Result};
use crate::record::Record;

use super::Codec;

/// Plain-mapping JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Emit indented JSON (easier to read by hand, larger on disk)
    pub pretty: bool,
}

impl JsonCodec {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(record)
        } else {
            serde_json::to_vec(record)
        };
        bytes.map_err(|e| FsdbError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        serde_json::from_slice(bytes).map_err(|e| FsdbError::Decode(e.to_string()))
    }
}
