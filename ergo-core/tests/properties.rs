//! Property tests for playback, targets and dispatch

use ergo_core::device_id;
use ergo_core::erg::{ErgDispatcher, TargetUpdate};
use ergo_core::events::Event;
use ergo_core::plan::{Step, WorkoutPlan};
use ergo_core::sequencer::{PlaybackState, Sequencer};
use ergo_core::target::{classify, round_half_up, target_watts, FallbackPolicy};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Pause,
    Resume,
    Skip,
    Reset,
    Tick,
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::Skip),
        1 => Just(Op::Reset),
        8 => Just(Op::Tick),
    ]
}

fn run_op(seq: &mut Sequencer, op: Op) -> Option<Event> {
    match op {
        Op::Start => seq.start(),
        Op::Pause => seq.pause(),
        Op::Resume => seq.resume(),
        Op::Skip => seq.skip(),
        Op::Reset => seq.reset(),
        Op::Tick => seq.tick(),
    }
}

fn plan_from(durations_s: &[f64]) -> WorkoutPlan {
    let steps: Vec<Step> = durations_s
        .iter()
        .map(|d| Step::fixed(70.0, *d).unwrap())
        .collect();
    WorkoutPlan::from_steps(&steps).unwrap()
}

proptest! {
    #[test]
    fn total_is_sum_of_steps(durations in proptest::collection::vec(0.0f64..3600.0, 0..40)) {
        let plan = plan_from(&durations);
        let sum: u64 = plan.steps().iter().map(|s| s.duration_ms as u64).sum();
        prop_assert_eq!(plan.total_duration_ms(), sum);

        let seq = Sequencer::new(plan, 100);
        prop_assert_eq!(seq.total_ms(), sum);
    }

    #[test]
    fn ticks_within_step_count_down(
        duration_ms in 20_000u32..1_000_000,
        quantum_ms in 10u32..200,
        ticks in 0u32..50,
    ) {
        let plan = plan_from(&[duration_ms as f64 / 1000.0]);
        let mut seq = Sequencer::new(plan, quantum_ms);
        seq.start();
        for _ in 0..ticks {
            prop_assert_eq!(seq.tick(), None);
        }
        prop_assert_eq!(seq.state().time_left_ms, duration_ms - ticks * quantum_ms);
        prop_assert_eq!(seq.state().elapsed_ms, (ticks * quantum_ms) as u64);
    }

    #[test]
    fn progressive_staircase(
        from in 0.0f64..150.0,
        span in 0.0f64..100.0,
        ftp in 100.0f64..400.0,
        duration_s in 1u32..1200,
        a in 0u32..1_500_000,
        b in 0u32..1_500_000,
    ) {
        let to = from + span;
        let step = Step::progressive(from, to, duration_s as f64).unwrap();
        let policy = FallbackPolicy::HALF_FTP;
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        let start_w = round_half_up(from / 100.0 * ftp);
        let max_w = round_half_up(to / 100.0 * ftp);
        let clamped = late.min(step.duration_ms);
        let expected = (start_w + 10 * (clamped / 10_000) as i64).min(max_w);

        let late_w = target_watts(&step, ftp, late, policy);
        prop_assert_eq!(late_w as i64, expected);
        prop_assert!(target_watts(&step, ftp, early, policy) <= late_w);
    }

    #[test]
    fn zone_is_monotonic(low in 0u16..2000, extra in 0u16..2000, ftp in 1.0f64..500.0) {
        let high = low.saturating_add(extra);
        prop_assert!(classify(low, ftp) <= classify(high, ftp));
    }

    #[test]
    fn repeated_key_dispatched_once(
        step_index in 0usize..20,
        watts in 1u16..1000,
        repeats in 1usize..50,
    ) {
        let update = TargetUpdate {
            step_index,
            watts,
            power_controlled: true,
            has_started: true,
            finished: false,
            run: 1,
            trainer: Some(device_id("FitnessEquipment_5_7504")),
        };
        let mut dispatcher = ErgDispatcher::new();
        let issued = (0..repeats).filter(|_| dispatcher.offer(&update).is_some()).count();
        prop_assert_eq!(issued, 1);
    }

    #[test]
    fn reset_always_idles(
        durations in proptest::collection::vec(0.5f64..30.0, 0..6),
        ops in proptest::collection::vec(any_op(), 0..300),
    ) {
        let mut seq = Sequencer::new(plan_from(&durations), 500);
        for op in ops {
            run_op(&mut seq, op);
        }
        seq.reset();
        prop_assert_eq!(seq.state(), PlaybackState::default());
    }

    #[test]
    fn finished_at_most_once_per_run(
        durations in proptest::collection::vec(0.5f64..30.0, 1..6),
        ops in proptest::collection::vec(any_op(), 0..400),
    ) {
        let mut seq = Sequencer::new(plan_from(&durations), 500);
        let mut finished_this_run = 0;
        for op in ops {
            match run_op(&mut seq, op) {
                Some(Event::Started) | Some(Event::Reset) => finished_this_run = 0,
                Some(Event::Finished) => finished_this_run += 1,
                _ => {}
            }
            prop_assert!(finished_this_run <= 1);
        }
    }

    #[test]
    fn elapsed_matches_completed_steps(
        durations in proptest::collection::vec(1.0f64..30.0, 1..6),
        ops in proptest::collection::vec(any_op(), 0..300),
    ) {
        // Quantum divides every step duration, so no overflow is dropped at
        // a boundary and both counters stay in lockstep
        let whole: Vec<f64> = durations.iter().map(|d| d.floor()).collect();
        let mut seq = Sequencer::new(plan_from(&whole), 1000);
        for op in ops {
            run_op(&mut seq, op);
            let state = seq.state();
            if state.is_running() {
                let step = seq.current_step().unwrap();
                let expected = seq.plan().offset_of(state.step_index)
                    + (step.duration_ms - state.time_left_ms) as u64;
                prop_assert_eq!(state.elapsed_ms, expected.min(seq.total_ms()));
            }
        }
    }
}
