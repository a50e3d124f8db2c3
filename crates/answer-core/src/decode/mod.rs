//! Backend response framing.
//!
//! Each backend frames its answer differently:
//! - the reasoning engine streams SSE-style lines (`data: {...}`), see [`lines`]
//! - the stream-answer endpoint sends back-to-back JSON values with no
//!   delimiter, see [`concatenated`]
//! - the unary answer endpoint returns a single JSON object
//!
//! The line decoder tolerates garbage lines; the concatenated decoder stops at
//! the first corrupt value. Both keep whatever was decoded before the problem.

pub mod concatenated;
pub mod lines;

pub use concatenated::ConcatenatedChunks;
pub use lines::{decode_line, line_chunks, ChunkStream};

use crate::error::{GatewayError, Result};
use crate::types::{BackendKind, RawChunk};

/// Parse a unary response body, which must be exactly one JSON object.
pub fn decode_unary(backend: BackendKind, body: &[u8]) -> Result<RawChunk> {
    let value: RawChunk = serde_json::from_slice(body).map_err(|e| GatewayError::Decode {
        backend,
        message: format!("invalid response body: {}", e),
    })?;

    if !value.is_object() {
        return Err(GatewayError::Decode {
            backend,
            message: "response body is not a JSON object".to_string(),
        });
    }

    Ok(value)
}
