use shared::{domain::ActuatorState, error::CommandError, protocol::Command};

use crate::session::Session;

/// Turns a `/<action>/<argument>` string into the actuator state it requests.
///
/// Commands that arrive before a front end is selected are dropped, never queued.
pub fn normalize(session: &Session, text: &str) -> Result<ActuatorState, CommandError> {
    if !session.is_ready() {
        return Err(CommandError::NotReady);
    }
    Command::parse(text)?.actuator_state()
}
