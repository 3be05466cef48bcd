//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines and strips the terminator; writes lines
//! with a CRLF appended. Lines are limited to 512 bytes (the IRC standard)
//! by default.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtoError, Result};

/// Newline-terminated line codec.
pub struct LineCodec {
    /// Index of next byte to check for newline.
    next_index: usize,
    /// Maximum line length in bytes.
    max_len: usize,
}

impl LineCodec {
    /// Default maximum line length (the IRC message size limit).
    pub const DEFAULT_MAX_LEN: usize = 512;

    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for a newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtoError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let data = String::from_utf8(line.to_vec()).map_err(|e| ProtoError::InvalidUtf8 {
                byte_pos: e.utf8_error().valid_up_to(),
            })?;

            Ok(Some(data.trim_end_matches(['\r', '\n']).to_string()))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtoError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtoError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(msg.len() + 2);
        dst.extend(msg.into_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
