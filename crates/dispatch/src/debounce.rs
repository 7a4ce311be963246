use std::time::Duration;

use shared::domain::ActuatorState;
use tokio::time::Instant;

pub const DEFAULT_RELEASE_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_HOLD_CONFIRM_INTERVAL: Duration = Duration::from_millis(720);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Armed by key-repeat events; firing means the key was let go.
    Release,
    /// Armed by a new press; firing turns the LED off when no repeats follow.
    HoldConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTimer {
    pub kind: TimerKind,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimings {
    pub release: Duration,
    pub hold_confirm: Duration,
}

impl Default for DebounceTimings {
    fn default() -> Self {
        Self {
            release: DEFAULT_RELEASE_INTERVAL,
            hold_confirm: DEFAULT_HOLD_CONFIRM_INTERVAL,
        }
    }
}

/// Infers press/release episodes from a keydown-only stream.
///
/// There is a single timer slot: arming either kind replaces whatever was
/// armed before, so at most one timer is ever live.
#[derive(Debug)]
pub struct KeyDebouncer {
    timings: DebounceTimings,
    last_key: Option<char>,
    timer: Option<ActiveTimer>,
}

impl KeyDebouncer {
    pub fn new(timings: DebounceTimings) -> Self {
        Self {
            timings,
            last_key: None,
            timer: None,
        }
    }

    pub fn last_key(&self) -> Option<char> {
        self.last_key
    }

    pub fn active_timer(&self) -> Option<ActiveTimer> {
        self.timer
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|timer| timer.deadline)
    }

    /// Feeds one key event. Returns the state to dispatch right away, if any.
    pub fn on_key(&mut self, key: char, now: Instant) -> Option<ActuatorState> {
        if self.last_key == Some(key) {
            self.arm(TimerKind::Release, now);
            return None;
        }

        self.last_key = Some(key);
        self.arm(TimerKind::HoldConfirm, now);
        Some(ActuatorState::On)
    }

    /// Fires the armed timer, leaving the slot empty.
    pub fn fire(&mut self) -> Option<ActuatorState> {
        let timer = self.timer.take()?;
        if timer.kind == TimerKind::Release {
            self.last_key = None;
        }
        Some(ActuatorState::Off)
    }

    fn arm(&mut self, kind: TimerKind, now: Instant) {
        let interval = match kind {
            TimerKind::Release => self.timings.release,
            TimerKind::HoldConfirm => self.timings.hold_confirm,
        };
        self.timer = Some(ActiveTimer {
            kind,
            deadline: now + interval,
        });
    }
}

impl Default for KeyDebouncer {
    fn default() -> Self {
        Self::new(DebounceTimings::default())
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
