use std::char::REPLACEMENT_CHARACTER;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::engine::EngineHandle;

const READ_CHUNK: usize = 64;

/// Decodes a raw byte stream into characters, one event per character.
///
/// Multi-byte sequences split across reads are held back until complete.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<char> {
        self.pending.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        loop {
            let (valid_up_to, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    decoded.extend(text.chars());
                    self.pending.clear();
                    return decoded;
                }
                Err(err) => (err.valid_up_to(), err.error_len()),
            };

            if let Ok(text) = std::str::from_utf8(&self.pending[..valid_up_to]) {
                decoded.extend(text.chars());
            }

            match invalid_len {
                Some(len) => {
                    decoded.push(REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid_up_to + len);
                }
                None => {
                    // incomplete tail
                    self.pending.drain(..valid_up_to);
                    return decoded;
                }
            }
        }
    }
}

/// Reads raw console bytes and forwards each decoded character to the engine.
///
/// Returns when the reader hits EOF or the engine stops accepting events.
pub async fn pump_input<R>(mut reader: R, handle: EngineHandle) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = Utf8Decoder::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            debug!("input: stream closed");
            return Ok(());
        }
        for ch in decoder.push(&chunk[..read]) {
            if !handle.send_input(ch).await {
                debug!("input: engine stopped");
                return Ok(());
            }
        }
    }
}
