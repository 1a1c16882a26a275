use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to spawn backend process with command {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {}ms waiting for backend startup.", waited.as_millis())]
    StartupTimeout { waited: Duration },

    #[error("Backend process exited before becoming reachable: {status}")]
    ExitedBeforeReady { status: String },

    #[error("Failed to poll backend process status: {0}")]
    Poll(#[source] std::io::Error),

    #[error("Invalid backend launch plan: {0}")]
    InvalidLaunchPlan(String),

    #[error("Backend supervisor state is unavailable: {0}")]
    StatePoisoned(&'static str),

    #[error("Backend is already starting.")]
    AlreadyStarting,

    #[error("Backend was stopped before it became reachable.")]
    StoppedDuringStartup,
}

impl SupervisorError {
    /// Fatal errors abort startup; the window is never created after one of these.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AlreadyStarting)
    }
}
