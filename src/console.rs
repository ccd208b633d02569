#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result as AnyResult};
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::domain::{parse_line, Command};
use crate::service::LoadController;

const LINE_QUEUE: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Quiet,
    Print(String),
    Quit,
}

/// Run one command against the controller. Blocks while workers are joined.
///
/// `quit` only reports itself; the caller runs the shutdown sequence.
pub fn apply(ctrl: &LoadController, cmd: Command, format: ReportFormat) -> AnyResult<Reply> {
    debug!(command = %cmd.kind(), "apply");
    match cmd {
        Command::Memory(n) => ctrl.set_memory_target(n),
        Command::Load(n) => {
            if let Err(e) = ctrl.set_worker_target(n) {
                error!(error = %format!("{e:#}"), target = n, "worker target not reached");
            }
        }
        Command::MaxRand(n) => ctrl.set_random_range(n),
        Command::ResetPerf => ctrl.reset_stats(),
        Command::Perf => {
            let report = ctrl.report();
            let text = match format {
                ReportFormat::Text => report.to_string(),
                ReportFormat::Json => serde_json::to_string(&report).context("serialize perf report")?,
            };
            return Ok(Reply::Print(text));
        }
        Command::Metrics => {
            let buf = ctrl.metrics().encode_text()?;
            let text = String::from_utf8(buf).context("metrics text is not utf-8")?;
            return Ok(Reply::Print(text.trim_end().to_owned()));
        }
        Command::Quit => return Ok(Reply::Quit),
    }
    Ok(Reply::Quiet)
}

/// [`apply`] on the blocking pool, so joins never stall the runtime.
pub async fn execute(ctrl: &LoadController, cmd: Command, format: ReportFormat) -> AnyResult<Reply> {
    let ctrl = ctrl.clone();
    tokio::task::spawn_blocking(move || apply(&ctrl, cmd, format))
        .await
        .context("controller task")?
}

pub async fn shutdown(ctrl: &LoadController) -> AnyResult<()> {
    let ctrl = ctrl.clone();
    tokio::task::spawn_blocking(move || ctrl.shutdown())
        .await
        .context("shutdown task")?
}

/// Forward lines from `reader` to the console on a plain thread. A blocked
/// read never holds up the runtime; the thread exits once the receiver is
/// dropped or input ends.
pub fn spawn_line_reader<R>(reader: R) -> AnyResult<mpsc::Receiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_QUEUE);
    thread::Builder::new()
        .name("loadgen-stdin".into())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })
        .context("spawn line reader")?;
    Ok(rx)
}

/// Apply commands line by line until `quit` or end of input, then shut the
/// controller down. The shutdown also runs when reading, applying or writing
/// fails. Commands after `quit` on the same line are dropped.
/// Returns how many commands were applied, `quit` included.
pub async fn run_console<W: Write>(
    mut lines: mpsc::Receiver<io::Result<String>>,
    ctrl: &LoadController,
    mut out: W,
    format: ReportFormat,
) -> AnyResult<usize> {
    let res = read_commands(&mut lines, ctrl, &mut out, format).await;
    if let Err(e) = &res {
        error!(error = %format!("{e:#}"), "console failed");
    }
    shutdown(ctrl).await?;
    res
}

async fn read_commands<W: Write>(
    lines: &mut mpsc::Receiver<io::Result<String>>,
    ctrl: &LoadController,
    out: &mut W,
    format: ReportFormat,
) -> AnyResult<usize> {
    let mut applied = 0usize;
    while let Some(line) = lines.recv().await {
        let line = line.context("read command")?;
        for cmd in parse_line(&line) {
            applied += 1;
            match execute(ctrl, cmd, format).await? {
                Reply::Quiet => {}
                Reply::Print(text) => {
                    writeln!(out, "{text}").context("write reply")?;
                    out.flush().context("flush reply")?;
                }
                Reply::Quit => return Ok(applied),
            }
        }
    }
    Ok(applied)
}
