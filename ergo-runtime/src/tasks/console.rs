//! Console task
//!
//! Prints playback events and status lines published by the session.

use embassy_futures::select::{select, Either};
use log::info;

use crate::channels::Bus;
use crate::console::{format_event, format_status};

/// Console task - status output loop
pub async fn console_task(bus: &Bus) {
    info!("Console ready; commands: start pause resume skip reset status ftp <W> trainer <id|auto> quit");

    loop {
        match select(bus.status.wait(), bus.console_stop.wait()).await {
            Either::First(report) => {
                if let Some(event) = &report.event {
                    println!("{}", format_event(event, &report.snapshot));
                }
                println!("{}", format_status(&report.snapshot));
            }
            Either::Second(()) => break,
        }
    }
}
