use serde::Deserialize;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::{
    append_log,
    backend_process_lifecycle::{BackendHandle, BackendLogSink},
    supervisor_state::SupervisorStateMachine,
    BackendConfig,
};

#[derive(Debug, Default, Deserialize)]
pub struct RuntimeManifest {
    pub python: Option<String>,
    pub entrypoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub packaged_mode: bool,
}

#[derive(Debug)]
pub struct BackendState {
    pub(crate) handle: Mutex<Option<BackendHandle>>,
    pub(crate) config: BackendConfig,
    pub(crate) supervisor: Mutex<SupervisorStateMachine>,
    pub(crate) is_spawning: AtomicBool,
    pub(crate) is_quitting: AtomicBool,
    pub(crate) log: BackendLogSink,
}

impl BackendState {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_log_sink(config, append_log)
    }

    pub fn with_log_sink(config: BackendConfig, log: BackendLogSink) -> Self {
        Self {
            handle: Mutex::new(None),
            config,
            supervisor: Mutex::new(SupervisorStateMachine::default()),
            is_spawning: AtomicBool::new(false),
            is_quitting: AtomicBool::new(false),
            log,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.config.base_url
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new(BackendConfig::from_env())
    }
}

pub struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    pub fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
