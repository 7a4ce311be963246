use crate::{
    domain::{ActuatorState, Mode},
    error::{CommandError, ModeError},
};

const VALUE_ACTION: &str = "value";

/// Interprets a line typed before any front end was chosen.
///
/// Returns `Ok(None)` for an empty line, which the caller swallows.
pub fn parse_mode_line(line: &str) -> Result<Option<Mode>, ModeError> {
    if line.is_empty() {
        return Ok(None);
    }

    let token = line.split('/').nth(1).unwrap_or_default();
    match token {
        "web" => Ok(Some(Mode::Web)),
        "cli" => Ok(Some(Mode::Cli)),
        other => Err(ModeError::Unrecognized {
            token: other.to_string(),
        }),
    }
}

/// A slash-delimited command, `/<action>/<argument>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: String,
    pub argument: String,
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let trimmed = text.trim();
        let mut segments = trimmed.split('/');

        let leading = segments.next().unwrap_or_default();
        let action = segments.next().unwrap_or_default();
        let argument = segments.next().unwrap_or_default();
        if !leading.is_empty() || action.is_empty() || argument.is_empty() {
            return Err(CommandError::Malformed(trimmed.to_string()));
        }

        Ok(Self {
            action: action.to_string(),
            argument: argument.to_string(),
        })
    }

    pub fn actuator_state(&self) -> Result<ActuatorState, CommandError> {
        match (self.action.as_str(), self.argument.as_str()) {
            (VALUE_ACTION, "1") => Ok(ActuatorState::On),
            (VALUE_ACTION, "0") => Ok(ActuatorState::Off),
            _ => Err(CommandError::NotImplemented {
                action: self.action.clone(),
                argument: self.argument.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
