use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    backend_api::{ApiEndpoint, ApiRequest, BackendClient},
    wizard_error::WizardError,
    OPERATION_POLL_FAST_ATTEMPTS, OPERATION_POLL_FAST_MS, OPERATION_POLL_INITIAL_MS,
    OPERATION_POLL_MAX_ATTEMPTS, OPERATION_POLL_SLOW_MS,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Running,
    Done,
    Error,
    #[default]
    #[serde(other)]
    Idle,
}

/// Snapshot of the backend's single long-running operation slot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub state: OperationState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl OperationStatus {
    /// Accepts both `{success, status: {...}}` and a bare status object.
    pub fn from_payload(payload: &Value) -> Result<Self, WizardError> {
        let status = payload
            .get("status")
            .filter(|status| status.is_object())
            .unwrap_or(payload);
        Self::deserialize(status).map_err(|error| WizardError::Backend {
            status: 200,
            message: format!("Unexpected status payload ({error})"),
        })
    }

    pub fn is_for(&self, operation: &str) -> bool {
        self.operation.as_deref() == Some(operation)
    }

    /// The error text shown to the user for an `error` state.
    pub fn failure_message(&self) -> String {
        self.last_error
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| self.message.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub operation: String,
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollDecision {
    Continue {
        delay: Duration,
        progress: Option<ProgressUpdate>,
    },
    Done(OperationStatus),
    Failed(String),
}

/// Tracks one polling session for a named operation.
#[derive(Debug, Clone)]
pub struct OperationPoller {
    operation: String,
    attempts: u32,
    max_attempts: u32,
}

impl OperationPoller {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            attempts: 0,
            max_attempts: OPERATION_POLL_MAX_ATTEMPTS,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn initial_delay() -> Duration {
        Duration::from_millis(OPERATION_POLL_INITIAL_MS)
    }

    pub fn begin_attempt(&mut self) -> Result<(), WizardError> {
        if self.attempts >= self.max_attempts {
            return Err(WizardError::OperationTimeout {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        Ok(())
    }

    fn running_delay(&self) -> Duration {
        if self.attempts < OPERATION_POLL_FAST_ATTEMPTS {
            Duration::from_millis(OPERATION_POLL_FAST_MS)
        } else {
            Duration::from_millis(OPERATION_POLL_SLOW_MS)
        }
    }

    pub fn observe(&self, status: &OperationStatus) -> PollDecision {
        if !status.is_for(&self.operation) {
            return PollDecision::Continue {
                delay: Duration::from_millis(OPERATION_POLL_FAST_MS),
                progress: None,
            };
        }

        match status.state {
            OperationState::Running => PollDecision::Continue {
                delay: self.running_delay(),
                progress: Some(ProgressUpdate {
                    operation: self.operation.clone(),
                    percent: clamp_running_progress(status.progress),
                    message: status.message.clone(),
                }),
            },
            OperationState::Done => PollDecision::Done(status.clone()),
            OperationState::Error => PollDecision::Failed(status.failure_message()),
            // The slot is ours but nothing started yet.
            OperationState::Idle => PollDecision::Continue {
                delay: Duration::from_millis(OPERATION_POLL_FAST_MS),
                progress: None,
            },
        }
    }
}

/// Running progress never reports completion; only `done` may show 100%.
pub fn clamp_running_progress(progress: Option<f64>) -> u8 {
    progress
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 99.0) as u8)
        .unwrap_or(0)
}

pub fn fetch_operation_status(client: &BackendClient) -> Result<OperationStatus, WizardError> {
    let payload = client.send(&ApiRequest::new(ApiEndpoint::Status))?;
    OperationStatus::from_payload(&payload)
}

/// Polls until `operation` reports `done`. Fetch errors abandon polling; there is no retry.
pub fn poll_operation(
    operation: &str,
    mut fetch: impl FnMut() -> Result<OperationStatus, WizardError>,
    mut sleep: impl FnMut(Duration),
    mut on_progress: impl FnMut(&ProgressUpdate),
) -> Result<OperationStatus, WizardError> {
    let mut poller = OperationPoller::new(operation);
    sleep(OperationPoller::initial_delay());

    loop {
        poller.begin_attempt()?;
        let status = fetch()?;
        match poller.observe(&status) {
            PollDecision::Continue { delay, progress } => {
                if let Some(progress) = progress {
                    on_progress(&progress);
                }
                sleep(delay);
            }
            PollDecision::Done(status) => return Ok(status),
            PollDecision::Failed(message) => return Err(WizardError::OperationFailed(message)),
        }
    }
}
