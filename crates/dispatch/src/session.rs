use shared::{domain::Mode, error::ModeError};

/// Process-wide front end selection plus the pre-selection input buffer.
#[derive(Debug, Default)]
pub struct Session {
    mode: Mode,
    buffer: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_ready(&self) -> bool {
        self.mode != Mode::Unselected
    }

    /// Locks in the front end. Mode is write-once for the life of the session.
    pub fn lock_mode(&mut self, mode: Mode) -> Result<(), ModeError> {
        if self.is_ready() {
            return Err(ModeError::AlreadySelected { current: self.mode });
        }
        self.mode = mode;
        Ok(())
    }

    pub fn push_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
