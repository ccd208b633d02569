#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use loadgen::console::{execute, run_console, shutdown, spawn_line_reader, ReportFormat};
use loadgen::{Config, LoadController};
use tracing::{info, warn};

fn init_tracing() {
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    fmt.json().init();
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::parse();
    init_tracing();
    let format = if config.json_perf { ReportFormat::Json } else { ReportFormat::Text };
    let ctrl = LoadController::new(config.sleep, config.buffer_size)?;
    info!(
        sleep_seconds = config.sleep.as_secs_f64(),
        buffer_size = config.buffer_size,
        "starting load generator"
    );
    for cmd in config.initial_commands() {
        execute(&ctrl, cmd, format).await?;
    }

    let lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
    tokio::select! {
        res = run_console(lines, &ctrl, std::io::stdout(), format) => {
            let applied = res?;
            info!(applied, "console closed");
        }
        res = tokio::signal::ctrl_c() => {
            res.context("listen for ctrl-c")?;
            warn!("interrupted, shutting down");
            shutdown(&ctrl).await?;
        }
    }
    Ok(())
}
