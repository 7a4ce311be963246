use serde::{Deserialize, Serialize};

/// Logical state of the remote LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorState {
    On,
    Off,
}

impl ActuatorState {
    /// Value carried by the `led` query parameter of the outbound request.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::On => "1",
            Self::Off => "0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Unselected,
    Cli,
    Web,
}

impl Mode {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Unselected => "IMP",
            Self::Cli => "CLI",
            Self::Web => "WEB",
        }
    }
}
