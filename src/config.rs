#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use clap::Parser;
use std::time::Duration;

use crate::domain::Command;
use crate::lib_mem::DEFAULT_BUFFER_SIZE;
use crate::validation::{validate_buffer_size, validate_sleep_seconds};

/// Synthetic memory and CPU load generator. Reads commands from stdin:
/// `memory:N`, `load:N`, `maxrand:N`, `perf`, `resetperf`, `metrics`, `quit`.
#[derive(Parser, Debug, Clone)]
#[command(name = "loadgen", version)]
pub struct Config {
    /// Seconds each worker sleeps after a write (real number, >= 0)
    #[arg(value_name = "SLEEP_SECONDS", value_parser = parse_sleep)]
    pub sleep: Duration,

    /// Bytes per buffer
    #[arg(long, env = "LOADGEN_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE, value_parser = parse_buffer_size)]
    pub buffer_size: usize,

    /// Print `perf` reports as JSON objects
    #[arg(long)]
    pub json_perf: bool,

    /// Initial buffer count
    #[arg(long, default_value_t = 0)]
    pub memory: u32,

    /// Initial worker count
    #[arg(long, default_value_t = 0)]
    pub load: u32,

    /// Initial random range
    #[arg(long, default_value_t = 0)]
    pub maxrand: u32,
}

impl Config {
    /// Commands equivalent to the initial-target flags, in the order they
    /// should run: range first so new workers start writing immediately.
    #[must_use]
    pub fn initial_commands(&self) -> Vec<Command> {
        let mut cmds = Vec::new();
        if self.maxrand > 0 {
            cmds.push(Command::MaxRand(i64::from(self.maxrand)));
        }
        if self.memory > 0 {
            cmds.push(Command::Memory(i64::from(self.memory)));
        }
        if self.load > 0 {
            cmds.push(Command::Load(i64::from(self.load)));
        }
        cmds
    }
}

fn parse_sleep(s: &str) -> Result<Duration, String> {
    let seconds: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    validate_sleep_seconds(seconds).map_err(|e| format!("{e:#}"))
}

fn parse_buffer_size(s: &str) -> Result<usize, String> {
    let bytes: usize = s.trim().parse().map_err(|e| format!("{e}"))?;
    validate_buffer_size(bytes).map_err(|e| format!("{e:#}"))
}
