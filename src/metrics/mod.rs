//! Prometheus metrics for the scan loop and the HTTP surface.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub cycles_skipped_total: IntCounter,
    pub cycle_duration_seconds: Histogram,
    pub alerts_emitted_total: IntCounterVec,
    pub alerts_suppressed_total: IntCounter,
    pub alerts_truncated_total: IntCounter,
    pub instrument_failures_total: IntCounter,
    pub last_cycle_timestamp: IntGauge,
    pub last_tick_timestamp: IntGauge,
    pub http_requests_total: IntCounterVec,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new("scan_cycles_total", "Completed scan cycles")?;
        let cycles_skipped_total = IntCounter::new(
            "scan_cycles_skipped_total",
            "Scheduler ticks skipped because the market was closed",
        )?;
        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("scan_cycle_duration_seconds", "Wall time of one scan cycle")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let alerts_emitted_total = IntCounterVec::new(
            Opts::new("alerts_emitted_total", "Alerts handed to the sink"),
            &["kind"],
        )?;
        let alerts_suppressed_total = IntCounter::new(
            "alerts_suppressed_total",
            "Candidate alerts dropped inside the dedup window",
        )?;
        let alerts_truncated_total = IntCounter::new(
            "alerts_truncated_total",
            "Candidate alerts cut by the per-symbol cap",
        )?;
        let instrument_failures_total = IntCounter::new(
            "instrument_failures_total",
            "Instruments skipped in a cycle because of an error",
        )?;
        let last_cycle_timestamp = IntGauge::new(
            "last_cycle_timestamp_seconds",
            "Unix time the last cycle finished",
        )?;
        let last_tick_timestamp = IntGauge::new(
            "scheduler_last_tick_timestamp_seconds",
            "Unix time of the last scheduler tick, run or skipped",
        )?;
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests served"),
            &["route", "status"],
        )?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(cycles_skipped_total.clone()))?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(alerts_emitted_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(alerts_truncated_total.clone()))?;
        registry.register(Box::new(instrument_failures_total.clone()))?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;
        registry.register(Box::new(last_tick_timestamp.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            cycles_skipped_total,
            cycle_duration_seconds,
            alerts_emitted_total,
            alerts_suppressed_total,
            alerts_truncated_total,
            instrument_failures_total,
            last_cycle_timestamp,
            last_tick_timestamp,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
