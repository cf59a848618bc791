//! Telemetry task
//!
//! Polls the sensor backend at a fixed interval and hands each snapshot to
//! the session. Failed polls are logged; the next interval retries.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};
use log::{info, trace, warn};

use ergo_core::traits::TelemetrySource;

use crate::channels::Bus;

/// Telemetry task - poll loop
pub async fn telemetry_task<S: TelemetrySource>(bus: &Bus, mut source: S, poll_ms: u32) {
    info!("Telemetry task started ({} ms interval)", poll_ms);

    let mut ticker = Ticker::every(Duration::from_millis(poll_ms as u64));
    let mut failures: u32 = 0;

    loop {
        match select(source.poll(), bus.telemetry_stop.wait()).await {
            Either::First(Ok(snapshot)) => {
                if failures > 0 {
                    info!("Telemetry recovered after {} failed polls", failures);
                    failures = 0;
                }
                trace!("Polled {} sensors", snapshot.len());
                bus.telemetry.signal(snapshot);
            }
            Either::First(Err(e)) => {
                failures = failures.saturating_add(1);
                // Only the first failure of a streak is worth a warning
                if failures == 1 {
                    warn!("Telemetry poll failed: {}", e);
                } else {
                    trace!("Telemetry poll failed again: {}", e);
                }
            }
            Either::Second(()) => break,
        }

        if let Either::Second(()) = select(ticker.next(), bus.telemetry_stop.wait()).await {
            break;
        }
    }

    info!("Telemetry task stopped");
}
