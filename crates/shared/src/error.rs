use thiserror::Error;

use crate::domain::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    #[error("command not recognized '{token}'")]
    Unrecognized { token: String },
    #[error("mode already selected: {current:?}")]
    AlreadySelected { current: Mode },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unable to process request at this time")]
    NotReady,
    #[error("malformed command '{0}'")]
    Malformed(String),
    #[error("not yet implemented '/{action}/{argument}'")]
    NotImplemented { action: String, argument: String },
}
