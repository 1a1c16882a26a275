use std::{
    path::Path,
    sync::{atomic::Ordering, MutexGuard},
};

use crate::{
    backend_http,
    backend_process_lifecycle::{self, BackendHandle},
    launch_plan,
    logging::LogCategory,
    supervisor_error::SupervisorError,
    supervisor_state::{StopReason, SupervisorPhase, SupervisorStateMachine},
    AtomicFlagGuard, BackendState, LaunchPlan,
};

impl BackendState {
    fn with_supervisor<T>(
        &self,
        f: impl FnOnce(&mut SupervisorStateMachine) -> T,
    ) -> Result<T, SupervisorError> {
        let mut guard = self
            .supervisor
            .lock()
            .map_err(|_| SupervisorError::StatePoisoned("supervisor state lock poisoned"))?;
        Ok(f(&mut guard))
    }

    pub fn phase(&self) -> SupervisorPhase {
        self.supervisor
            .lock()
            .map(|guard| guard.phase())
            .unwrap_or(SupervisorPhase::Failed)
    }

    /// The window may only be created once the backend has been confirmed healthy.
    pub fn may_create_main_window(&self) -> bool {
        self.phase() == SupervisorPhase::Healthy
    }

    pub fn backend_pid(&self) -> Option<u32> {
        self.handle
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(BackendHandle::pid))
    }

    pub fn is_quitting(&self) -> bool {
        self.is_quitting.load(Ordering::Relaxed)
    }

    pub fn mark_quitting(&self) {
        self.is_quitting.store(true, Ordering::Relaxed);
    }

    /// Resolves the launch plan for this layout and starts the backend.
    pub fn ensure_backend_ready(&self, resource_dir: Option<&Path>) -> Result<(), SupervisorError> {
        if self.phase() == SupervisorPhase::Healthy {
            return Ok(());
        }

        if backend_http::probe_backend_status(
            &self.config.health_check_url(),
            self.config.probe_timeout,
        ) {
            (self.log)(
                LogCategory::Startup,
                &format!(
                    "backend already reachable at {}; attaching without spawning",
                    self.config.base_url
                ),
            );
            self.with_supervisor(|machine| {
                machine.begin_start();
                machine.mark_healthy();
            })?;
            return Ok(());
        }

        let plan = launch_plan::resolve_launch_plan(resource_dir)
            .map_err(SupervisorError::InvalidLaunchPlan);
        match plan {
            Ok(plan) => self.start_with_plan(&plan),
            Err(error) => {
                self.with_supervisor(|machine| {
                    machine.begin_start();
                    machine.mark_failed(error.to_string());
                })?;
                Err(error)
            }
        }
    }

    /// Spawns the backend described by `plan` and waits for it to become healthy.
    ///
    /// At most one handle exists per state: concurrent callers get `AlreadyStarting`, and
    /// a healthy supervisor returns immediately.
    pub fn start_with_plan(&self, plan: &LaunchPlan) -> Result<(), SupervisorError> {
        let Some(_spawning) = AtomicFlagGuard::try_set(&self.is_spawning) else {
            return Err(SupervisorError::AlreadyStarting);
        };

        let began = self.with_supervisor(|machine| {
            if machine.is_healthy() {
                return Ok(false);
            }
            if machine.begin_start() {
                Ok(true)
            } else {
                Err(SupervisorError::InvalidLaunchPlan(format!(
                    "Backend cannot be started from phase {:?}.",
                    machine.phase()
                )))
            }
        })??;
        if !began {
            return Ok(());
        }

        if self.is_quitting() {
            self.with_supervisor(|machine| machine.mark_stopped(StopReason::Requested))?;
            return Err(SupervisorError::StoppedDuringStartup);
        }

        (self.log)(LogCategory::Startup, "starting backend");
        let handle = match backend_process_lifecycle::spawn_backend(plan, &self.config, self.log) {
            Ok(handle) => handle,
            Err(error) => {
                self.with_supervisor(|machine| machine.mark_failed(error.to_string()))?;
                return Err(error);
            }
        };
        *self.lock_handle()? = Some(handle);

        let readiness = backend_process_lifecycle::wait_for_backend(&self.config, self.log, || {
            self.startup_exit_status()
        })
        .and_then(|_| self.commit_healthy());

        match readiness {
            Ok(()) => {
                (self.log)(LogCategory::Startup, "backend is healthy");
                Ok(())
            }
            Err(error) => {
                let handle = self.lock_handle().ok().and_then(|mut slot| slot.take());
                backend_process_lifecycle::stop_backend(handle, self.log);
                let stopped = matches!(error, SupervisorError::StoppedDuringStartup);
                let reason = error.to_string();
                self.with_supervisor(|machine| {
                    if stopped {
                        machine.mark_stopped(StopReason::Requested)
                    } else {
                        machine.mark_failed(reason)
                    }
                })?;
                Err(error)
            }
        }
    }

    fn lock_handle(&self) -> Result<MutexGuard<'_, Option<BackendHandle>>, SupervisorError> {
        self.handle
            .lock()
            .map_err(|_| SupervisorError::StatePoisoned("backend handle lock poisoned"))
    }

    /// Exit check used while waiting for readiness. A handle taken by `stop_backend` or a
    /// pending quit ends the wait.
    fn startup_exit_status(&self) -> Result<Option<String>, SupervisorError> {
        if self.is_quitting() {
            return Err(SupervisorError::StoppedDuringStartup);
        }
        match self.lock_handle()?.as_mut() {
            Some(handle) => handle.exit_status(),
            None => Err(SupervisorError::StoppedDuringStartup),
        }
    }

    /// Marks the supervisor healthy while holding the handle slot, so a concurrent stop
    /// either happens before (and wins) or after (and sees Healthy).
    fn commit_healthy(&self) -> Result<(), SupervisorError> {
        let slot = self.lock_handle()?;
        if slot.is_none() || self.is_quitting() {
            return Err(SupervisorError::StoppedDuringStartup);
        }
        if self.with_supervisor(|machine| machine.mark_healthy())? {
            Ok(())
        } else {
            Err(SupervisorError::StoppedDuringStartup)
        }
    }

    /// Stops the backend if one is running. Safe to call any number of times, from any phase.
    pub fn stop_backend(&self) {
        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if handle.is_none() {
            return;
        }

        backend_process_lifecycle::stop_backend(handle, self.log);
        let _ = self.with_supervisor(|machine| machine.mark_stopped(StopReason::Requested));
    }

    /// Checks whether the backend died on its own. Returns its exit status the first time it is seen.
    pub fn poll_unexpected_exit(&self) -> Option<String> {
        if self.phase() != SupervisorPhase::Healthy {
            return None;
        }
        let mut guard = self.handle.lock().ok()?;
        let status = match guard.as_mut()?.exit_status() {
            Ok(Some(status)) => status,
            Ok(None) => return None,
            Err(error) => error.to_string(),
        };
        guard.take();
        drop(guard);

        let _ = self.with_supervisor(|machine| machine.mark_stopped(StopReason::UnexpectedExit));
        (self.log)(
            LogCategory::Desktop,
            &format!("backend exited unexpectedly ({status}); not restarting"),
        );
        Some(status)
    }
}
