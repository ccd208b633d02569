#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use loadgen::metrics::Metrics;

#[test]
fn create_and_encode() {
    let m = Metrics::new().expect("metrics");
    m.buffers.set(3);
    let buf = m.encode_text().expect("encode");
    let text = String::from_utf8(buf).expect("utf8");
    assert!(text.contains("loadgen_buffers 3"));
    assert!(text.contains("loadgen_stats_resets_total 0"));
}

#[test]
fn registries_are_independent() {
    let a = Metrics::new().expect("a");
    let b = Metrics::new().expect("b");
    a.workers.set(2);
    assert_eq!(b.workers.get(), 0);
}
