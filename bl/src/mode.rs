//! Run modes and the per-iteration dispatch decision

use serde::{Deserialize, Serialize};

/// How the batch loop repeats its handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunMode {
    /// Run forever, sleeping between runs unless the handler asks for a rerun
    #[default]
    #[serde(rename = "continuous")]
    Continuous,
    /// Run the handler once and stop
    #[serde(rename = "once")]
    Once,
    /// Rerun immediately while the handler asks for it, then stop
    #[serde(rename = "complete")]
    ToCompletion,
    /// Like `ToCompletion` but sleep before every rerun
    #[serde(rename = "complete-slow")]
    ToCompletionSlow,
}

/// What the runner does after a handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stop,
    RerunImmediate,
    RerunAfterSleep,
}

impl RunMode {
    /// Combine the handler's rerun request with this mode
    pub fn decide(self, rerun: bool) -> Decision {
        match (self, rerun) {
            (Self::Once, _) => Decision::Stop,
            (Self::Continuous, true) => Decision::RerunImmediate,
            (Self::Continuous, false) => Decision::RerunAfterSleep,
            (Self::ToCompletion, true) => Decision::RerunImmediate,
            (Self::ToCompletion, false) => Decision::Stop,
            (Self::ToCompletionSlow, true) => Decision::RerunAfterSleep,
            (Self::ToCompletionSlow, false) => Decision::Stop,
        }
    }

    /// Whether pings fire after each run when the config does not say
    pub fn pings_by_default(self) -> bool {
        !matches!(self, Self::Once)
    }

    /// Whether this mode can ever sleep between runs
    pub fn sleeps(self) -> bool {
        matches!(self, Self::Continuous | Self::ToCompletionSlow)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continuous => write!(f, "continuous"),
            Self::Once => write!(f, "once"),
            Self::ToCompletion => write!(f, "complete"),
            Self::ToCompletionSlow => write!(f, "complete-slow"),
        }
    }
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(Self::Continuous),
            "once" => Ok(Self::Once),
            "complete" => Ok(Self::ToCompletion),
            "complete-slow" => Ok(Self::ToCompletionSlow),
            _ => Err(format!("Unknown run mode: {}", s)),
        }
    }
}
