#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Result as AnyResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use crate::perf::PerfSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Load,
    Memory,
    MaxRand,
    Perf,
    ResetPerf,
    Metrics,
    Quit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::ResetPerf,
        CommandKind::MaxRand,
        CommandKind::Metrics,
        CommandKind::Memory,
        CommandKind::Load,
        CommandKind::Perf,
        CommandKind::Quit,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Load => "load",
            CommandKind::Memory => "memory",
            CommandKind::MaxRand => "maxrand",
            CommandKind::Perf => "perf",
            CommandKind::ResetPerf => "resetperf",
            CommandKind::Metrics => "metrics",
            CommandKind::Quit => "quit",
        }
    }

    #[must_use]
    pub fn takes_param(self) -> bool {
        matches!(
            self,
            CommandKind::Load | CommandKind::Memory | CommandKind::MaxRand
        )
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> AnyResult<Self> {
        match Self::ALL.iter().find(|k| k.name() == s) {
            Some(kind) => Ok(*kind),
            None => bail!(format!("unknown command: {s}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Target buffer count.
    Memory(i64),
    /// Target worker count.
    Load(i64),
    /// Upper bound (exclusive) of write indices.
    MaxRand(i64),
    Perf,
    ResetPerf,
    Metrics,
    Quit,
}

impl Command {
    /// Build a command from its name and raw parameter text. Commands that
    /// need an integer and did not get a valid one are rejected; the others
    /// ignore any parameter.
    pub fn build(kind: CommandKind, param: Option<&str>) -> AnyResult<Self> {
        let value = match (kind.takes_param(), param) {
            (false, _) => 0,
            (true, Some(p)) => p
                .parse::<i64>()
                .map_err(|e| anyhow::anyhow!("{kind}: bad parameter {p:?}: {e}"))?,
            (true, None) => bail!("{kind}: missing parameter"),
        };
        Ok(match kind {
            CommandKind::Memory => Command::Memory(value),
            CommandKind::Load => Command::Load(value),
            CommandKind::MaxRand => Command::MaxRand(value),
            CommandKind::Perf => Command::Perf,
            CommandKind::ResetPerf => Command::ResetPerf,
            CommandKind::Metrics => Command::Metrics,
            CommandKind::Quit => Command::Quit,
        })
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Memory(_) => CommandKind::Memory,
            Command::Load(_) => CommandKind::Load,
            Command::MaxRand(_) => CommandKind::MaxRand,
            Command::Perf => CommandKind::Perf,
            Command::ResetPerf => CommandKind::ResetPerf,
            Command::Metrics => CommandKind::Metrics,
            Command::Quit => CommandKind::Quit,
        }
    }
}

// A name, then optionally `:` and a decimal integer with spaces allowed
// around the colon.
static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(load|memory|quit|perf|resetperf|maxrand|metrics)(?:\s*:\s*([0-9]+))?")
        .expect("command pattern is valid")
});

/// Extract every command in `line`, in order. Anything else in the line is
/// ignored, as are commands whose parameter is missing or does not fit.
#[must_use]
pub fn parse_line(line: &str) -> Vec<Command> {
    COMMAND_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let param = caps.get(2).map(|m| m.as_str());
            match CommandKind::from_str(name).and_then(|kind| Command::build(kind, param)) {
                Ok(cmd) => Some(cmd),
                Err(e) => {
                    debug!(error = %format!("{e:#}"), "skipping command");
                    None
                }
            }
        })
        .collect()
}

/// What `perf` shows: pool sizes plus the counter snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PerfReport {
    pub buffers: usize,
    pub workers: usize,
    pub random_range: usize,
    #[serde(flatten)]
    pub snapshot: PerfSnapshot,
}

impl std::fmt::Display for PerfReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "memory: {}, load: {}, hit-rate: {:.6}, throughput: {:.6}, duration: {:.6}",
            self.buffers,
            self.workers,
            self.snapshot.hit_rate,
            self.snapshot.throughput,
            self.snapshot.elapsed_seconds,
        )
    }
}
