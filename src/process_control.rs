use std::{process::Child, thread};

#[cfg(target_os = "windows")]
use std::process::{Command, Stdio};

#[cfg(target_os = "windows")]
fn send_termination(child: &mut Child) -> Result<(), String> {
    // taskkill /t also takes down the interpreter's own children.
    Command::new("taskkill")
        .args(["/pid", &child.id().to_string(), "/t", "/f"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .map(|_| ())
        .or_else(|_| child.kill())
        .map_err(|error| format!("Failed to terminate backend pid {}: {error}", child.id()))
}

#[cfg(not(target_os = "windows"))]
fn send_termination(child: &mut Child) -> Result<(), String> {
    child
        .kill()
        .map_err(|error| format!("Failed to terminate backend pid {}: {error}", child.id()))
}

/// Signals the child and reaps it on a detached thread so the caller never blocks.
pub fn stop_child_process(mut child: Child) -> Result<(), String> {
    let already_exited = matches!(child.try_wait(), Ok(Some(_)));
    let result = if already_exited {
        Ok(())
    } else {
        send_termination(&mut child)
    };

    thread::spawn(move || {
        let _ = child.wait();
    });
    result
}
