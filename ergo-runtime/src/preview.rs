//! Workout preview table

use std::fmt::Write as _;

use ergo_core::plan::{PowerTarget, WorkoutPlan};
use ergo_core::target::{classify, effective_ftp, target_watts, FallbackPolicy};

fn duration(ms: u32) -> String {
    let seconds = ms / 1000;
    if seconds % 60 == 0 {
        format!("{}min", seconds / 60)
    } else if seconds >= 60 {
        format!("{}min {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Render one line per step: duration, target, wattage span and zone
pub fn render_preview(plan: &WorkoutPlan, ftp: f64, fallback: FallbackPolicy) -> String {
    let ftp = effective_ftp(ftp);
    let mut out = String::new();

    let _ = writeln!(out, "FTP {} W, {} steps", ftp, plan.len());
    for (index, step) in plan.steps().iter().enumerate() {
        let start = target_watts(step, ftp, 0, fallback);
        let end = target_watts(step, ftp, step.duration_ms, fallback);

        let watts = match step.target {
            PowerTarget::Progressive(_) if start != end => format!("{}-{} W", start, end),
            _ => format!("{} W", start),
        };
        let zone = if start == end || classify(start, ftp) == classify(end, ftp) {
            classify(start, ftp).to_string()
        } else {
            format!("{} to {}", classify(start, ftp), classify(end, ftp).number())
        };

        let _ = writeln!(
            out,
            "{:>3}. {:<9} {:<18} {:<11} {:<7} {}",
            index + 1,
            duration(step.duration_ms),
            step.target.to_string(),
            watts,
            zone,
            step.cadence_hint()
        );
    }

    let total_s = plan.total_duration_ms() / 1000;
    let _ = write!(out, "Total {}:{:02}", total_s / 60, total_s % 60);
    out
}
