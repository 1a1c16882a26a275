use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

static LOG_WRITE_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Startup,
    Shutdown,
    Desktop,
    Backend,
    BackendStderr,
}

impl LogCategory {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Startup => "desktop:startup",
            Self::Shutdown => "desktop:shutdown",
            Self::Desktop => "desktop",
            Self::Backend => "backend",
            Self::BackendStderr => "backend:stderr",
        }
    }
}

pub fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(file_name),
        None => std::env::temp_dir().join("ruie").join(file_name),
    }
}

pub fn format_log_line(timestamp: &str, category: LogCategory, message: &str) -> String {
    format!("[{timestamp}] [{}] {}", category.tag(), message.trim_end())
}

/// Appends one line to `log_path`. I/O failures are swallowed.
pub fn append_log_line(log_path: &Path, category: LogCategory, message: &str) {
    let timestamp = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string();
    let line = format_log_line(&timestamp, category, message);

    if cfg!(debug_assertions) {
        eprintln!("{line}");
    }

    let _guard = LOG_WRITE_LOCK.lock();
    if let Some(parent) = log_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
        let _ = writeln!(file, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_log_line_separates_desktop_and_backend_sources() {
        let desktop = format_log_line("t", LogCategory::Desktop, "window created");
        let backend = format_log_line("t", LogCategory::Backend, " * Running on http://127.0.0.1:5000\n");
        assert_eq!(desktop, "[t] [desktop] window created");
        assert_eq!(backend, "[t] [backend]  * Running on http://127.0.0.1:5000");
    }

    #[test]
    fn resolve_desktop_log_path_uses_logs_subdirectory() {
        let path = resolve_desktop_log_path(Some(PathBuf::from("/tmp/root")), "desktop.log");
        assert_eq!(path, PathBuf::from("/tmp/root/logs/desktop.log"));
    }

    #[test]
    fn append_log_line_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("logs").join("desktop.log");

        append_log_line(&path, LogCategory::Startup, "first");
        append_log_line(&path, LogCategory::BackendStderr, "second");

        let contents = fs::read_to_string(&path).expect("log file should exist");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[desktop:startup] first"));
        assert!(lines[1].ends_with("[backend:stderr] second"));
    }
}
