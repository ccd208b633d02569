#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::io::Write;
use std::process::{Command, Stdio};

fn loadgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_loadgen"));
    cmd.env_remove("LOADGEN_BUFFER_SIZE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_sleep_exits_with_usage() {
    let out = loadgen().stdin(Stdio::null()).output().expect("run");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert!(stderr.contains("SLEEP_SECONDS"), "stderr: {stderr}");
}

#[test]
fn invalid_sleep_exits_non_zero() {
    for bad in ["fast", "inf", "NaN"] {
        let out = loadgen().arg(bad).stdin(Stdio::null()).output().expect("run");
        assert_eq!(out.status.code(), Some(2), "sleep {bad}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("SLEEP_SECONDS"), "stderr: {stderr}");
    }
}

#[test]
fn zero_buffer_size_from_env_is_rejected() {
    let out = loadgen()
        .arg("0")
        .env("LOADGEN_BUFFER_SIZE", "0")
        .stdin(Stdio::null())
        .output()
        .expect("run");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("buffer size must be > 0"), "stderr: {stderr}");
}

#[test]
fn quit_from_stdin_exits_cleanly() {
    let mut child = loadgen()
        .args(["0.001", "--buffer-size", "64"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"memory:2\nperf\nquit\n")
        .expect("write");
    let out = child.wait_with_output().expect("wait");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("memory: 2, load: 0, hit-rate: "), "stdout: {stdout}");
}

#[cfg(unix)]
#[test]
fn sigint_exits_while_stdin_is_open() {
    use std::thread;
    use std::time::{Duration, Instant};

    let mut child = loadgen()
        .args(["0.001", "--memory", "2", "--load", "1", "--maxrand", "2", "--buffer-size", "64"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn");
    // Held open so the console never sees end of input.
    let _stdin = child.stdin.take().expect("stdin");
    thread::sleep(Duration::from_millis(500));
    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("kill");
    assert!(sent.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().expect("try_wait") {
            break Some(status);
        }
        if Instant::now() >= deadline {
            break None;
        }
        thread::sleep(Duration::from_millis(20));
    };
    if status.is_none() {
        let _ = child.kill();
        let _ = child.wait();
    }
    let status = status.expect("process still running 5s after SIGINT");
    assert!(status.success(), "status: {status}");
}
