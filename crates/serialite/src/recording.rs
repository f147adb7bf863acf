// SPDX-FileCopyrightText: 2026 Serialite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder the embedding application
//! installs (Prometheus, statsd, etc.) can collect these metrics. Without a
//! recorder every call is a no-op.

use std::time::Duration;

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all serialite metric descriptions.
///
/// Call once after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("serialite_jobs_enqueued_total", "Jobs accepted by the queue");
    describe_counter!(
        "serialite_jobs_completed_total",
        "Jobs finished by the consumer worker, by outcome"
    );
    describe_gauge!("serialite_queue_depth", "Jobs waiting for the consumer worker");
    describe_histogram!(
        "serialite_job_duration_seconds",
        "Time the consumer spent running one job"
    );
    describe_counter!(
        "serialite_worker_restarts_total",
        "Consumer workers started again after a crash"
    );
}

pub(crate) fn record_enqueued(kind: &'static str, depth: usize) {
    metrics::counter!("serialite_jobs_enqueued_total", "kind" => kind).increment(1);
    set_queue_depth(depth);
}

pub(crate) fn record_completed(kind: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("serialite_jobs_completed_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("serialite_job_duration_seconds", "kind" => kind)
        .record(elapsed.as_secs_f64());
}

pub(crate) fn set_queue_depth(depth: usize) {
    metrics::gauge!("serialite_queue_depth").set(depth as f64);
}

pub(crate) fn record_worker_restart() {
    metrics::counter!("serialite_worker_restarts_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        register_metrics();
        record_enqueued("fire", 3);
        record_completed("prepared", false, Duration::from_millis(5));
        set_queue_depth(0);
        record_worker_restart();
    }
}
