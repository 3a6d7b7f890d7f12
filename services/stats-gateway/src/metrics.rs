//! Prometheus metrics for the statistics gateway
//!
//! Metric families:
//! - `stats_gateway_transactions_total{outcome}`: ingested payloads by outcome
//! - `stats_gateway_rejected_payloads_total{reason}`: payloads refused at validation
//! - `stats_gateway_resets_total`: window resets
//! - `stats_gateway_compacted_buckets_total`: buckets evicted by compaction
//! - `stats_gateway_live_buckets`: buckets currently held by the engine
//!
//! Without the `monitoring` feature every recorder call is a no-op.

#[cfg(feature = "monitoring")]
use metrics::{counter, describe_counter, describe_gauge, gauge};
#[cfg(feature = "monitoring")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
#[cfg(feature = "monitoring")]
use std::sync::OnceLock;
#[cfg(feature = "monitoring")]
use tracing::{info, warn};

use window_stats::IngestOutcome;

#[cfg(feature = "monitoring")]
static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Gateway metrics recorder
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayMetrics;

impl GatewayMetrics {
    /// Install the process-wide Prometheus recorder
    ///
    /// Only the first call installs anything; later calls reuse the outcome.
    /// Returns whether a recorder is available for rendering.
    pub fn install() -> bool {
        #[cfg(feature = "monitoring")]
        {
            PROMETHEUS
                .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                    Ok(handle) => {
                        Self::register_metrics();
                        info!("Prometheus recorder installed");
                        Some(handle)
                    }
                    Err(e) => {
                        warn!("Failed to install Prometheus recorder: {}", e);
                        None
                    }
                })
                .is_some()
        }
        #[cfg(not(feature = "monitoring"))]
        {
            false
        }
    }

    /// Render the Prometheus exposition text, if a recorder is installed
    #[must_use]
    pub fn render() -> Option<String> {
        #[cfg(feature = "monitoring")]
        {
            PROMETHEUS
                .get()
                .and_then(Option::as_ref)
                .map(PrometheusHandle::render)
        }
        #[cfg(not(feature = "monitoring"))]
        {
            None
        }
    }

    #[cfg(feature = "monitoring")]
    fn register_metrics() {
        describe_counter!(
            "stats_gateway_transactions_total",
            "Transactions received, labelled by ingest outcome"
        );
        describe_counter!(
            "stats_gateway_rejected_payloads_total",
            "Transaction payloads refused at validation"
        );
        describe_counter!("stats_gateway_resets_total", "Window resets");
        describe_counter!(
            "stats_gateway_compacted_buckets_total",
            "Second buckets evicted by compaction"
        );
        describe_gauge!(
            "stats_gateway_live_buckets",
            "Second buckets currently held by the engine"
        );
    }

    /// Record an ingested transaction
    pub fn record_transaction(&self, outcome: IngestOutcome) {
        #[cfg(feature = "monitoring")]
        {
            let outcome = match outcome {
                IngestOutcome::Accepted => "accepted",
                IngestOutcome::Expired => "expired",
            };
            counter!("stats_gateway_transactions_total", "outcome" => outcome).increment(1);
        }
        #[cfg(not(feature = "monitoring"))]
        let _ = outcome;
    }

    /// Record a refused payload
    pub fn record_rejected(&self, reason: &'static str) {
        #[cfg(feature = "monitoring")]
        counter!("stats_gateway_rejected_payloads_total", "reason" => reason).increment(1);
        #[cfg(not(feature = "monitoring"))]
        let _ = reason;
    }

    /// Record a window reset
    pub fn record_reset(&self) {
        #[cfg(feature = "monitoring")]
        counter!("stats_gateway_resets_total").increment(1);
    }

    /// Record a compaction run
    pub fn record_compaction(&self, evicted: usize, live_buckets: usize) {
        #[cfg(feature = "monitoring")]
        {
            counter!("stats_gateway_compacted_buckets_total").increment(evicted as u64);
            self.set_live_buckets(live_buckets);
        }
        #[cfg(not(feature = "monitoring"))]
        let _ = (evicted, live_buckets);
    }

    /// Update the live bucket gauge
    pub fn set_live_buckets(&self, live_buckets: usize) {
        #[cfg(feature = "monitoring")]
        gauge!("stats_gateway_live_buckets").set(live_buckets as f64);
        #[cfg(not(feature = "monitoring"))]
        let _ = live_buckets;
    }
}
