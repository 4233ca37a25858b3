//! The evaluation pipeline
//!
//! One cycle runs aggregate → evaluate → route → publish over the trailing
//! window and reports how many groups it examined and how many alerts it
//! sent. Everything up to publishing is pure; delivery goes through the
//! [`AlertSink`] seam so that the scheduler can drive the real bus client
//! and tests can capture alerts instead.

pub mod aggregate;
pub mod evaluate;
pub mod route;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, trace};

use crate::config::AbsentBoundPolicy;
use crate::store::{ReadingsStore, StoreResult};

pub use aggregate::{Aggregate, aggregate};
pub use evaluate::BoundsCheck;
pub use route::Alert;

/// Delivery seam between the pipeline and the message bus
///
/// Delivery is fire-and-forget: implementations log failures and never
/// surface them, so one undeliverable alert cannot abort the rest of a
/// cycle.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: Alert);
}

/// Outcome of one evaluation cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Distinct (device, measurement) groups examined
    pub groups_examined: usize,

    /// Alerts handed to the sink
    pub alerts_sent: usize,
}

/// Run one full evaluation cycle
///
/// Pulls the trailing window from the store, aggregates per
/// (device, measurement) group, checks bounds and delivers an alert for
/// every breach. A store failure fails the cycle as a whole; no partial
/// summary is produced.
pub async fn run_cycle(
    store: &dyn ReadingsStore,
    window: chrono::Duration,
    policy: AbsentBoundPolicy,
    sink: &dyn AlertSink,
) -> StoreResult<CycleSummary> {
    let since = Utc::now() - window;
    let records = store.fetch_since(since).await?;

    trace!("{} readings in window since {}", records.len(), since);

    let aggregates = aggregate(records);
    let mut summary = CycleSummary {
        groups_examined: aggregates.len(),
        alerts_sent: 0,
    };

    for aggregate in &aggregates {
        let check = BoundsCheck::evaluate(
            aggregate.mean_value,
            aggregate.min_value,
            aggregate.max_value,
            policy,
        );

        trace!(
            "device {} {}: mean {} vs [{}, {}] -> breach: {}",
            aggregate.device_id,
            aggregate.measurement_name,
            aggregate.mean_value,
            check.effective_min,
            check.effective_max,
            check.breached
        );

        if !check.breached {
            continue;
        }

        let alert = Alert::build(aggregate, &check);
        debug!(
            "sending alert to {} for {}",
            alert.topic, alert.measurement_name
        );
        sink.deliver(alert).await;
        summary.alerts_sent += 1;
    }

    Ok(summary)
}
