//! ERG task
//!
//! Owns the [`ErgDispatcher`]. Each target published by the session is
//! offered to it; an issued command is sent over the link while newer
//! targets keep arriving. A target with a new key drops the unresolved
//! send, which aborts it, and the replacement is sent instead.

use core::pin::pin;

use embassy_futures::select::{select, select3, Either, Either3};
use log::{debug, info, warn};

use ergo_core::erg::{DispatchStats, ErgCommand, ErgDispatcher};
use ergo_core::traits::{ErgLink, LinkError};

use crate::channels::Bus;

fn log_result(command: &ErgCommand, result: Result<(), LinkError>) {
    match result {
        Ok(()) => debug!(
            "ERG {} W accepted by {} (generation {})",
            command.watts, command.device, command.generation
        ),
        Err(LinkError::Superseded) => debug!(
            "ERG generation {} superseded before sending",
            command.generation
        ),
        Err(e) => warn!(
            "ERG {} W for {} failed: {}",
            command.watts, command.device, e
        ),
    }
}

/// ERG task - dispatch loop
///
/// Returns the dispatcher counters once stopped. A command still in flight
/// at that point is aborted.
pub async fn erg_task<L: ErgLink>(bus: &Bus, mut link: L) -> DispatchStats {
    info!("ERG task started");

    let mut dispatcher = ErgDispatcher::new();
    let mut next: Option<ErgCommand> = None;

    'dispatch: loop {
        let command = match next.take() {
            Some(command) => command,
            None => match select(bus.targets.wait(), bus.erg_stop.wait()).await {
                Either::First(update) => match dispatcher.offer(&update) {
                    Some(command) => command,
                    None => continue,
                },
                Either::Second(()) => break,
            },
        };

        info!(
            "ERG {} -> {} W (step {}, generation {})",
            command.device,
            command.watts,
            command.step_index + 1,
            command.generation
        );

        let mut send = pin!(link.set_target_power(&command));
        loop {
            match select3(send.as_mut(), bus.targets.wait(), bus.erg_stop.wait()).await {
                Either3::First(result) => {
                    log_result(&command, result);
                    dispatcher.settle(command.generation);
                    break;
                }
                Either3::Second(update) => {
                    // Same key or ineligible: keep waiting on the current send
                    if let Some(replacement) = dispatcher.offer(&update) {
                        if let Some(aborted) = replacement.supersedes {
                            debug!(
                                "Aborting ERG generation {} for generation {}",
                                aborted, replacement.generation
                            );
                        }
                        next = Some(replacement);
                        break;
                    }
                }
                Either3::Third(()) => {
                    info!("Aborting ERG generation {} on shutdown", command.generation);
                    break 'dispatch;
                }
            }
        }
    }

    let stats = dispatcher.stats();
    info!(
        "ERG task stopped: {} issued, {} suppressed, {} ineligible",
        stats.issued, stats.suppressed, stats.ineligible
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use embassy_futures::{block_on, join::join, yield_now};

    use ergo_core::device_id;
    use ergo_core::erg::TargetUpdate;

    /// Link recording every send; sends either resolve at once or never
    struct MockLink {
        sent: Rc<RefCell<Vec<ErgCommand>>>,
        hang: bool,
    }

    impl MockLink {
        fn new(hang: bool) -> (Self, Rc<RefCell<Vec<ErgCommand>>>) {
            let sent = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    sent: sent.clone(),
                    hang,
                },
                sent,
            )
        }
    }

    impl ErgLink for MockLink {
        async fn set_target_power(&mut self, command: &ErgCommand) -> Result<(), LinkError> {
            self.sent.borrow_mut().push(command.clone());
            if self.hang {
                core::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    fn update(step_index: usize, watts: u16) -> TargetUpdate {
        TargetUpdate {
            step_index,
            watts,
            power_controlled: true,
            has_started: true,
            finished: false,
            run: 1,
            trainer: Some(device_id("FitnessEquipment_5_7504")),
        }
    }

    async fn settle() {
        for _ in 0..4 {
            yield_now().await;
        }
    }

    fn watts(sent: &Rc<RefCell<Vec<ErgCommand>>>) -> Vec<u16> {
        sent.borrow().iter().map(|c| c.watts).collect()
    }

    #[test]
    fn test_repeated_target_sent_once() {
        let bus = Bus::new();
        let (link, sent) = MockLink::new(false);

        let (stats, _) = block_on(join(erg_task(&bus, link), async {
            for target in [update(2, 150), update(2, 150), update(2, 150), update(3, 150)] {
                bus.targets.signal(target);
                settle().await;
            }
            bus.erg_stop.signal(());
        }));

        assert_eq!(watts(&sent), vec![150, 150]);
        assert_eq!(sent.borrow()[0].step_index, 2);
        assert_eq!(sent.borrow()[1].step_index, 3);
        assert_eq!(stats.issued, 2);
        assert_eq!(stats.suppressed, 2);
    }

    #[test]
    fn test_new_key_aborts_in_flight() {
        let bus = Bus::new();
        let (link, sent) = MockLink::new(true);

        let (stats, _) = block_on(join(erg_task(&bus, link), async {
            bus.targets.signal(update(0, 100));
            settle().await;
            // Same key while unresolved: no second send
            bus.targets.signal(update(0, 100));
            settle().await;
            bus.targets.signal(update(0, 110));
            settle().await;
            bus.erg_stop.signal(());
        }));

        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].watts, 110);
        assert_eq!(sent[1].supersedes, Some(1));
        assert_eq!(stats.issued, 2);
        assert_eq!(stats.suppressed, 1);
    }

    #[test]
    fn test_ineligible_update_keeps_send() {
        let bus = Bus::new();
        let (link, sent) = MockLink::new(true);

        block_on(join(erg_task(&bus, link), async {
            bus.targets.signal(update(0, 100));
            settle().await;
            let mut paused = update(1, 90);
            paused.power_controlled = false;
            bus.targets.signal(paused);
            settle().await;
            bus.erg_stop.signal(());
        }));

        assert_eq!(watts(&sent), vec![100]);
    }

    #[test]
    fn test_restart_resends_target() {
        let bus = Bus::new();
        let (link, sent) = MockLink::new(false);

        block_on(join(erg_task(&bus, link), async {
            bus.targets.signal(update(0, 100));
            settle().await;
            let mut restarted = update(0, 100);
            restarted.run = 2;
            bus.targets.signal(restarted);
            settle().await;
            bus.erg_stop.signal(());
        }));

        assert_eq!(watts(&sent), vec![100, 100]);
    }

    #[test]
    fn test_stop_when_idle() {
        let bus = Bus::new();
        bus.erg_stop.signal(());
        let (link, sent) = MockLink::new(false);

        let stats = block_on(erg_task(&bus, link));
        assert_eq!(stats, DispatchStats::default());
        assert!(sent.borrow().is_empty());
    }
}
