#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorPhase {
    NotStarted,
    Starting,
    Healthy,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    UnexpectedExit,
}

/// Tracks the bootstrap lifecycle of the backend process.
///
/// Only the edges below are legal; everything else is rejected and left unchanged:
/// `NotStarted -> Starting`, `Starting -> Healthy | Failed | Stopped`, `Healthy -> Stopped`,
/// and `Stopped -> Starting` for an explicit restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorStateMachine {
    phase: SupervisorPhase,
    last_stop_reason: Option<StopReason>,
    last_failure: Option<String>,
}

impl Default for SupervisorStateMachine {
    fn default() -> Self {
        Self {
            phase: SupervisorPhase::NotStarted,
            last_stop_reason: None,
            last_failure: None,
        }
    }
}

impl SupervisorStateMachine {
    pub fn phase(&self) -> SupervisorPhase {
        self.phase
    }

    pub fn last_stop_reason(&self) -> Option<StopReason> {
        self.last_stop_reason
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn is_healthy(&self) -> bool {
        self.phase == SupervisorPhase::Healthy
    }

    pub fn begin_start(&mut self) -> bool {
        match self.phase {
            SupervisorPhase::NotStarted | SupervisorPhase::Stopped => {
                self.phase = SupervisorPhase::Starting;
                self.last_stop_reason = None;
                true
            }
            _ => false,
        }
    }

    pub fn mark_healthy(&mut self) -> bool {
        if self.phase != SupervisorPhase::Starting {
            return false;
        }
        self.phase = SupervisorPhase::Healthy;
        true
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> bool {
        if self.phase != SupervisorPhase::Starting {
            return false;
        }
        self.phase = SupervisorPhase::Failed;
        self.last_failure = Some(reason.into());
        true
    }

    pub fn mark_stopped(&mut self, reason: StopReason) -> bool {
        if !matches!(
            self.phase,
            SupervisorPhase::Starting | SupervisorPhase::Healthy
        ) {
            return false;
        }
        self.phase = SupervisorPhase::Stopped;
        self.last_stop_reason = Some(reason);
        true
    }
}
