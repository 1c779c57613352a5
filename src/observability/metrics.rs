//! Metrics recording.
//!
//! # Metrics
//! - `lifecycle_probe_total` (counter): probe evaluations by probe and status
//! - `lifecycle_dependency_healthy` (gauge): 1=healthy, 0=unhealthy, per dependency
//! - `lifecycle_in_flight_requests` (gauge): work requests currently in flight
//! - `lifecycle_work_rejected_total` (counter): work refused during shutdown
//! - `lifecycle_drain_abandoned_total` (counter): requests abandoned at the drain deadline

use metrics::{counter, gauge};

pub fn record_probe(probe: &str, status: &'static str) {
    counter!("lifecycle_probe_total", "probe" => probe.to_string(), "status" => status).increment(1);
}

pub fn record_dependency_health(dependency: &str, healthy: bool) {
    gauge!("lifecycle_dependency_healthy", "dependency" => dependency.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_in_flight(count: u64) {
    gauge!("lifecycle_in_flight_requests").set(count as f64);
}

pub fn record_work_rejected() {
    counter!("lifecycle_work_rejected_total").increment(1);
}

pub fn record_drain_abandoned(abandoned: u64) {
    counter!("lifecycle_drain_abandoned_total").increment(abandoned);
}
