//! Line-framed (SSE-style) decoding.
//!
//! ```text
//! data: {"content":{"parts":[{"text":"Hello "}]}}
//!
//! : keep-alive
//! data: {"content":{"parts":[{"text":"world"}]}}
//! ```
//!
//! Lines end at `\n`, `\r\n` or a bare `\r`. Every non-empty line is trimmed,
//! loses an optional `data: ` prefix and is parsed as JSON. Lines that are not
//! JSON are dropped. The stream ends at EOF; there is no terminator token.

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::types::RawChunk;

pub type ChunkStream = Pin<Box<dyn Stream<Item = RawChunk> + Send>>;

const DATA_PREFIX: &str = "data: ";

/// Decode one line, or `None` for blank and non-JSON lines.
pub fn decode_line(line: &[u8]) -> Option<RawChunk> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    match serde_json::from_str(payload) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            log::debug!("Skipping non-JSON stream line ({}): {}", e, payload);
            None
        }
    }
}

/// Decode every line of a `\n`-terminated segment; a bare `\r` also ends a line.
fn decode_segment(segment: &[u8]) -> Vec<RawChunk> {
    segment.split(|b| *b == b'\r').filter_map(decode_line).collect()
}

/// Turn a byte stream into a lazy stream of decoded chunks.
///
/// A transport error ends the sequence early; chunks already yielded stand,
/// an unterminated line pending at that point is dropped.
pub fn line_chunks<S, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let bytes = bytes.map(|next| next.map_err(|e| io::Error::other(e.to_string())));
    let mut segments = StreamReader::new(Box::pin(bytes)).split(b'\n');

    let stream = async_stream::stream! {
        loop {
            match segments.next_segment().await {
                Ok(Some(segment)) => {
                    for chunk in decode_segment(&segment) {
                        yield chunk;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Stream interrupted, keeping chunks decoded so far: {}", e);
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}
