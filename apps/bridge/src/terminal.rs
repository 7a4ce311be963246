//! Raw console handling.

use std::io::{self, Write};

use crossterm::terminal;

/// Keeps the terminal in raw mode until dropped.
pub struct RawModeGuard {
    enabled: bool,
}

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { enabled: true })
    }

    pub fn restore(&mut self) {
        if self.enabled {
            let _ = terminal::disable_raw_mode();
            self.enabled = false;
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Raw mode disables output post-processing, so bare `\n` no longer returns
/// the cursor. This writer puts the `\r` back.
pub struct CrlfWriter<W> {
    inner: W,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (idx, byte) in buf.iter().enumerate() {
            if *byte == b'\n' && (idx == 0 || buf[idx - 1] != b'\r') {
                self.inner.write_all(&buf[start..idx])?;
                self.inner.write_all(b"\r\n")?;
                start = idx + 1;
            }
        }
        self.inner.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub fn crlf_stderr() -> CrlfWriter<io::Stderr> {
    CrlfWriter::new(io::stderr())
}
