//! Background timers for the relay.
//!
//! The reshuffle timer is started once, when mapping activates, and runs for
//! the rest of the process. The status reporter runs from startup.

use std::sync::Arc;

use anchorcast_core::RelayHub;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Starts the recurring mapping reshuffle. The first reshuffle happens one
/// full period after this call.
pub fn start_reshuffle_timer(hub: Arc<RelayHub>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Reshuffle timer started - mappings will change every {:?}",
            period
        );
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if hub.reshuffle() {
                debug!("Scheduled reshuffle broadcast");
            }
        }
    })
}

/// Logs anchor and client counts on a fixed period while any anchor exists.
pub fn start_status_reporter(hub: Arc<RelayHub>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let status = hub.status();
            if status.anchors > 0 {
                info!(
                    "Status: {} nodes stored, {} clients connected, mapping {}",
                    status.anchors,
                    status.connections,
                    status.mapping_state.as_str()
                );
            }
        }
    })
}
