pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_BACKEND_PORT: u16 = 5000;
pub const HEALTH_CHECK_PATH: &str = "/api/status";
pub const HEALTH_CHECK_INTERVAL_MS: u64 = 1_000;
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 30_000;
pub const HEALTH_PROBE_TIMEOUT_MS: u64 = 2_000;
pub const EXIT_WATCH_INTERVAL_MS: u64 = 1_000;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_TITLE: &str = "RUIE - Launcher Theme Editor";
pub const MAIN_WINDOW_WIDTH: f64 = 1280.0;
pub const MAIN_WINDOW_HEIGHT: f64 = 820.0;
pub const MAIN_WINDOW_MIN_WIDTH: f64 = 1024.0;
pub const MAIN_WINDOW_MIN_HEIGHT: f64 = 700.0;

pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const PACKAGED_ROOT_DIR_NAME: &str = ".ruie";
pub const BACKEND_ENTRYPOINT: &str = "server.py";
pub const BACKEND_RESOURCE_DIR: &str = "backend";
pub const BACKEND_RUNTIME_MANIFEST: &str = "backend/runtime-manifest.json";
pub const DEFAULT_PYTHON_COMMAND: &str = "python";

pub const BACKEND_URL_ENV: &str = "RUIE_BACKEND_URL";
pub const BACKEND_CMD_ENV: &str = "RUIE_BACKEND_CMD";
pub const BACKEND_CWD_ENV: &str = "RUIE_BACKEND_CWD";
pub const BACKEND_TIMEOUT_ENV: &str = "RUIE_BACKEND_TIMEOUT_MS";
pub const BACKEND_POLL_ENV: &str = "RUIE_BACKEND_POLL_MS";
pub const PYTHON_ENV: &str = "RUIE_PYTHON";
pub const SERVER_DIR_ENV: &str = "RUIE_SERVER_DIR";
pub const ROOT_DIR_ENV: &str = "RUIE_ROOT";
pub const DEV_MODE_ENV: &str = "RUIE_DESKTOP_DEV";

pub const API_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const OPERATION_POLL_INITIAL_MS: u64 = 100;
pub const OPERATION_POLL_FAST_MS: u64 = 500;
pub const OPERATION_POLL_SLOW_MS: u64 = 1_000;
pub const OPERATION_POLL_FAST_ATTEMPTS: u32 = 5;
pub const OPERATION_POLL_MAX_ATTEMPTS: u32 = 600;
