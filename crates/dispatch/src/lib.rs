//! Input-to-command dispatch for the LED bridge.
//!
//! Raw console characters and web commands both end up in [`Engine`], which
//! owns the session, the keystroke debouncer and the single timer slot.

pub mod debounce;
pub mod engine;
pub mod input;
pub mod normalizer;
pub mod session;

pub use debounce::{ActiveTimer, DebounceTimings, KeyDebouncer, TimerKind};
pub use engine::{Engine, EngineError, EngineEvent, EngineHandle, WebFrontEnd};
pub use input::{pump_input, Utf8Decoder};
pub use normalizer::normalize;
pub use session::Session;
