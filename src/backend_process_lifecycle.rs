use std::{
    fs,
    io::{BufRead, BufReader, Read},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::{
    backend_http,
    backend_readiness::{self, ReadinessPolicy, ReadyReport, SystemClock},
    build_debug_command,
    logging::LogCategory,
    process_control,
    supervisor_error::SupervisorError,
    BackendConfig, LaunchPlan,
};

pub type BackendLogSink = fn(LogCategory, &str);

/// The spawned backend. Owned by exactly one supervisor at a time.
#[derive(Debug)]
pub struct BackendHandle {
    child: Child,
    pid: u32,
    started_at: Instant,
}

impl BackendHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Non-blocking liveness query; returns the exit status text once the child is gone.
    pub fn exit_status(&mut self) -> Result<Option<String>, SupervisorError> {
        self.child
            .try_wait()
            .map(|status| status.map(|status| status.to_string()))
            .map_err(SupervisorError::Poll)
    }

    pub fn is_alive(&mut self) -> bool {
        matches!(self.exit_status(), Ok(None))
    }
}

fn forward_output<R>(stream: R, category: LogCategory, log: BackendLogSink)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => log(category, &line),
                Err(_) => break,
            }
        }
    });
}

pub fn spawn_backend(
    plan: &LaunchPlan,
    config: &BackendConfig,
    log: BackendLogSink,
) -> Result<BackendHandle, SupervisorError> {
    if !plan.cwd.exists() {
        fs::create_dir_all(&plan.cwd).map_err(|error| {
            SupervisorError::InvalidLaunchPlan(format!(
                "Failed to create backend cwd {}: {}",
                plan.cwd.display(),
                error
            ))
        })?;
    }

    let mut command = Command::new(&plan.cmd);
    command
        .args(&plan.args)
        .current_dir(&plan.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("PYTHONUNBUFFERED", "1")
        .env(
            "FLASK_ENV",
            if plan.packaged_mode {
                "production"
            } else {
                "development"
            },
        )
        .env("FLASK_PORT", config.port().to_string());

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let mut child = command.spawn().map_err(|source| SupervisorError::Spawn {
        command: build_debug_command(plan),
        source,
    })?;

    if let Some(stdout) = child.stdout.take() {
        forward_output(stdout, LogCategory::Backend, log);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_output(stderr, LogCategory::BackendStderr, log);
    }

    let pid = child.id();
    log(
        LogCategory::Desktop,
        &format!(
            "spawned backend pid={pid} command={:?} cwd={}",
            build_debug_command(plan),
            plan.cwd.display()
        ),
    );

    Ok(BackendHandle {
        child,
        pid,
        started_at: Instant::now(),
    })
}

/// Blocks until `/api/status` answers or the startup deadline passes.
///
/// `child_exit` is asked after every failed probe whether the spawned child is still
/// there; the caller owns the handle and tears it down on error.
pub fn wait_for_backend<E>(
    config: &BackendConfig,
    log: BackendLogSink,
    child_exit: E,
) -> Result<ReadyReport, SupervisorError>
where
    E: FnMut() -> Result<Option<String>, SupervisorError>,
{
    let status_url = config.health_check_url();
    let mut clock = SystemClock::start();

    let readiness = backend_readiness::wait_until_ready(
        ReadinessPolicy::from(config),
        || backend_http::probe_backend_status(&status_url, config.probe_timeout),
        child_exit,
        &mut clock,
    );

    match &readiness {
        Ok(report) => log(
            LogCategory::Desktop,
            &format!(
                "backend became healthy after {} poll(s) in {}ms",
                report.attempts,
                report.elapsed.as_millis()
            ),
        ),
        Err(error) => log(LogCategory::Desktop, &format!("backend startup failed: {error}")),
    }
    readiness
}

/// Best-effort teardown. Never fails and never blocks; `None` is a no-op.
pub fn stop_backend(handle: Option<BackendHandle>, log: BackendLogSink) {
    let Some(handle) = handle else {
        return;
    };

    let pid = handle.pid;
    match process_control::stop_child_process(handle.child) {
        Ok(()) => log(LogCategory::Shutdown, &format!("stopped backend pid={pid}")),
        Err(error) => log(
            LogCategory::Shutdown,
            &format!("failed to stop backend pid={pid}: {error}"),
        ),
    }
}
