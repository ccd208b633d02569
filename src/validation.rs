#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{bail, Result as AnyResult};
use std::time::Duration;

/// Inter-write sleep: a finite, non-negative number of seconds.
pub fn validate_sleep_seconds(seconds: f64) -> AnyResult<Duration> {
    if seconds.is_nan() {
        bail!("sleep must be a number");
    }
    if seconds < 0.0 {
        bail!("sleep must be >= 0");
    }
    match Duration::try_from_secs_f64(seconds) {
        Ok(d) => Ok(d),
        Err(e) => bail!(format!("sleep out of range: {e}")),
    }
}

pub fn validate_buffer_size(bytes: usize) -> AnyResult<usize> {
    if bytes == 0 {
        bail!("buffer size must be > 0");
    }
    Ok(bytes)
}
