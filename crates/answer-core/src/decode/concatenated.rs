//! Concatenated-object decoding for fully buffered bodies.
//!
//! ```text
//! {"answer":{"answerText":"x"}}{"session":"s1"}
//! [{"answer":{"answerText":"y"}}, {"session":{"name":"s2"}}]
//! ```
//!
//! Values are pulled one at a time from a single incremental parser, so the
//! buffer is scanned once. Arrays are flattened into their object elements.
//! The first value that fails to parse ends the sequence.

use serde_json::de::SliceRead;
use serde_json::{Deserializer, StreamDeserializer, Value};

use crate::types::RawChunk;

pub struct ConcatenatedChunks<'a> {
    values: StreamDeserializer<'a, SliceRead<'a>, Value>,
    pending: std::vec::IntoIter<Value>,
    stopped: bool,
}

impl<'a> ConcatenatedChunks<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            values: Deserializer::from_slice(body).into_iter::<Value>(),
            pending: Vec::new().into_iter(),
            stopped: false,
        }
    }

    /// Bytes consumed so far, including whitespace between values.
    pub fn byte_offset(&self) -> usize {
        self.values.byte_offset()
    }
}

impl Iterator for ConcatenatedChunks<'_> {
    type Item = RawChunk;

    fn next(&mut self) -> Option<RawChunk> {
        loop {
            if let Some(chunk) = self.pending.next() {
                return Some(chunk);
            }
            if self.stopped {
                return None;
            }

            match self.values.next()? {
                Ok(Value::Object(map)) => return Some(Value::Object(map)),
                Ok(Value::Array(items)) => {
                    self.pending = items
                        .into_iter()
                        .filter(Value::is_object)
                        .collect::<Vec<_>>()
                        .into_iter();
                }
                Ok(other) => {
                    log::debug!("Dropping non-object stream value: {}", other);
                }
                Err(e) => {
                    log::warn!(
                        "Failed to decode JSON chunk at byte {}: {}",
                        self.values.byte_offset(),
                        e
                    );
                    self.stopped = true;
                    return None;
                }
            }
        }
    }
}
