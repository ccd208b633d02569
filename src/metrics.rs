#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::{Context, Result as AnyResult};
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    pub buffers: IntGauge,
    pub workers: IntGauge,
    pub random_range: IntGauge,
    pub buffer_size_bytes: IntGauge,
    pub stats_resets_total: IntCounter,
}

fn gauge(registry: &Registry, name: &str, help: &str) -> AnyResult<IntGauge> {
    let g = IntGauge::with_opts(Opts::new(name, help)).with_context(|| format!("create {name}"))?;
    registry
        .register(Box::new(g.clone()))
        .with_context(|| format!("register {name}"))?;
    Ok(g)
}

impl Metrics {
    pub fn new() -> AnyResult<Self> {
        let registry = Registry::new();
        let buffers = gauge(&registry, "loadgen_buffers", "resident buffers")?;
        let workers = gauge(&registry, "loadgen_workers", "running workers")?;
        let random_range = gauge(&registry, "loadgen_random_range", "upper bound of write indices")?;
        let buffer_size_bytes = gauge(&registry, "loadgen_buffer_size_bytes", "bytes per buffer")?;
        let stats_resets_total = IntCounter::with_opts(Opts::new(
            "loadgen_stats_resets_total",
            "performance window resets",
        ))
        .context("create stats_resets_total")?;
        registry
            .register(Box::new(stats_resets_total.clone()))
            .context("register stats_resets_total")?;
        Ok(Self {
            registry,
            buffers,
            workers,
            random_range,
            buffer_size_bytes,
            stats_resets_total,
        })
    }

    pub fn encode_text(&self) -> AnyResult<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        encoder.encode(&mf, &mut buf).context("encode metrics")?;
        Ok(buf)
    }
}

/// Gauges only hold `i64`; saturate instead of wrapping.
pub(crate) fn gauge_value(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
