//! Prometheus metrics for the registry.
//!
//! [`RegisterMetrics`] owns a dedicated [`Registry`]; hosts encode it into
//! the Prometheus text format with [`RegisterMetrics::encode_text`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

pub struct RegisterMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Commands that were committed.
    pub commands_processed: IntCounter,
    /// Commands rejected, at any stage from decoding to commit.
    pub commands_failed: IntCounter,
    /// Registration votes recorded.
    pub votes_cast: IntCounter,
    /// Candidates admitted to the bonded set.
    pub nodes_admitted: IntCounter,
    /// Unbondings whose stake was returned.
    pub unbondings_completed: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Bonded indexing nodes after the last committed change.
    pub bonded_indexing_nodes: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time to execute and commit one command, in milliseconds.
    pub command_time_ms: Histogram,
}

impl RegisterMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let commands_processed = register_int_counter_with_registry!(
            Opts::new(
                "strato_register_commands_processed_total",
                "Registry commands committed"
            ),
            registry
        )
        .expect("failed to register commands_processed counter");

        let commands_failed = register_int_counter_with_registry!(
            Opts::new(
                "strato_register_commands_failed_total",
                "Registry commands rejected"
            ),
            registry
        )
        .expect("failed to register commands_failed counter");

        let votes_cast = register_int_counter_with_registry!(
            Opts::new(
                "strato_register_votes_cast_total",
                "Indexing node registration votes recorded"
            ),
            registry
        )
        .expect("failed to register votes_cast counter");

        let nodes_admitted = register_int_counter_with_registry!(
            Opts::new(
                "strato_register_nodes_admitted_total",
                "Indexing node candidates admitted"
            ),
            registry
        )
        .expect("failed to register nodes_admitted counter");

        let unbondings_completed = register_int_counter_with_registry!(
            Opts::new(
                "strato_register_unbondings_completed_total",
                "Unbondings whose stake was returned to the owner"
            ),
            registry
        )
        .expect("failed to register unbondings_completed counter");

        let bonded_indexing_nodes = register_int_gauge_with_registry!(
            Opts::new(
                "strato_register_bonded_indexing_nodes",
                "Current number of bonded indexing nodes"
            ),
            registry
        )
        .expect("failed to register bonded_indexing_nodes gauge");

        // 0.05 ms → ~800 ms
        let command_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "strato_register_command_time_ms",
                "Command execution time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.05, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register command_time_ms histogram");

        Self {
            registry,
            commands_processed,
            commands_failed,
            votes_cast,
            nodes_admitted,
            unbondings_completed,
            bonded_indexing_nodes,
            command_time_ms,
        }
    }

    /// Prometheus text exposition of every metric.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RegisterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_are_exposed() {
        let metrics = RegisterMetrics::new();
        metrics.commands_processed.inc();
        metrics.bonded_indexing_nodes.set(3);
        let text = metrics.encode_text().unwrap();
        assert!(text.contains("strato_register_commands_processed_total 1"));
        assert!(text.contains("strato_register_bonded_indexing_nodes 3"));
        assert!(text.contains("strato_register_command_time_ms_bucket"));
    }
}
