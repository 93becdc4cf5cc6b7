// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Observer sink (conc.sim external interface).
//!
//! Pure output — implementors must not block on simulation state, and
//! no worker calls these while holding a station's mutex. Default
//! method bodies are no-ops so a partial stub (e.g. in a test) only
//! needs to implement the hooks it cares about.

use crate::bike::SiteId;

/// Sink for simulation side effects: UI hints, travel animation
/// events, and human-readable log lines. The monitor core never calls
/// these — only `PersonWorker` and `RebalancerAgent` do.
pub trait Observer: Send + Sync {
    /// A station's bike count changed; `count` is the new total.
    fn set_bikes(&self, _site: SiteId, _count: usize) {}

    /// A person is riding a bike from `from` to `to`, taking `duration_ms`.
    fn travel(&self, _person_id: u32, _from: SiteId, _to: SiteId, _duration_ms: u64) {}

    /// A person is walking from `from` to `to`, taking `duration_ms`.
    fn walk(&self, _person_id: u32, _from: SiteId, _to: SiteId, _duration_ms: u64) {}

    /// The rebalancer van is driving from `from` to `to`.
    fn van_travel(&self, _from: SiteId, _to: SiteId, _duration_ms: u64) {}

    /// A human-readable log line attributed to worker `id` (`0` for the van).
    fn console_append_text(&self, _id: u32, _message: &str) {}
}

/// Default observer: routes every hook through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn set_bikes(&self, site: SiteId, count: usize) {
        tracing::debug!(site = site.0, count, "station count updated");
    }

    fn travel(&self, person_id: u32, from: SiteId, to: SiteId, duration_ms: u64) {
        tracing::info!(person_id, from = from.0, to = to.0, duration_ms, "riding");
    }

    fn walk(&self, person_id: u32, from: SiteId, to: SiteId, duration_ms: u64) {
        tracing::info!(person_id, from = from.0, to = to.0, duration_ms, "walking");
    }

    fn van_travel(&self, from: SiteId, to: SiteId, duration_ms: u64) {
        tracing::info!(from = from.0, to = to.0, duration_ms, "van driving");
    }

    fn console_append_text(&self, id: u32, message: &str) {
        tracing::info!(id, "{message}");
    }
}

/// Observer that discards everything; handy in tests that don't want
/// log noise but still need a concrete `Observer` to hand to workers.
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
