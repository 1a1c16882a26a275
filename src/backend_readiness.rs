use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{supervisor_error::SupervisorError, BackendConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&BackendConfig> for ReadinessPolicy {
    fn from(config: &BackendConfig) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.startup_timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

pub trait ReadinessClock {
    fn elapsed(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl ReadinessClock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Polls `probe` until it succeeds or `policy.timeout` elapses.
///
/// The probe always runs before the deadline is checked, so a success observed at
/// exactly the deadline is accepted. `child_exit` is consulted after every failed probe
/// and returns the exit status once the child is gone.
pub fn wait_until_ready<P, E, C>(
    policy: ReadinessPolicy,
    mut probe: P,
    mut child_exit: E,
    clock: &mut C,
) -> Result<ReadyReport, SupervisorError>
where
    P: FnMut() -> bool,
    E: FnMut() -> Result<Option<String>, SupervisorError>,
    C: ReadinessClock,
{
    let mut attempts = 0_u32;
    loop {
        attempts += 1;
        if probe() {
            return Ok(ReadyReport {
                attempts,
                elapsed: clock.elapsed(),
            });
        }

        if let Some(status) = child_exit()? {
            return Err(SupervisorError::ExitedBeforeReady { status });
        }

        let elapsed = clock.elapsed();
        if elapsed >= policy.timeout {
            return Err(SupervisorError::StartupTimeout { waited: elapsed });
        }

        let remaining = policy.timeout - elapsed;
        clock.sleep(policy.interval.min(remaining));
    }
}
