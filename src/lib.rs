#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod console;
pub mod domain;
pub mod lib_cpu;
pub mod lib_mem;
pub mod metrics;
pub mod perf;
pub mod service;
pub mod validation;

pub use config::Config;
pub use console::{run_console, spawn_line_reader, ReportFormat, Reply};
pub use domain::{parse_line, Command, CommandKind, PerfReport};
pub use lib_cpu::{WorkContext, WorkerPool, WriteOutcome};
pub use lib_mem::{BufferPool, DEFAULT_BUFFER_SIZE};
pub use metrics::Metrics;
pub use perf::{PerfSnapshot, PerformanceCounters};
pub use service::LoadController;
pub use validation::{validate_buffer_size, validate_sleep_seconds};
