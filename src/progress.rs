// Progress counter
//
// Tracks completed work units against a known total and logs a line each
// time the completed percentage crosses the configured step. Updates come
// from many worker threads at once; the running total is exact and the log
// lines are at-least-once (a racing pair of updates may both log). The
// update that reaches the total always emits the 100% line: a thread that
// loses the percentage exchange re-checks against the winner's value
// instead of dropping its line.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use log::debug;

/// Thread-safe percentage-step progress reporter.
pub struct Progress {
    label: String,
    total: u64,
    /// Minimum whole-percentage gap between two log lines.
    update_period: u32,
    num_complete: AtomicU64,
    last_logged_percentage: AtomicU32,
}

impl Progress {
    /// A counter targeting `total` units that logs every `update_period`
    /// percent. A zero period logs on every percentage change.
    pub fn new(label: impl Into<String>, total: u64, update_period: u32) -> Self {
        Progress {
            label: label.into(),
            total,
            update_period,
            num_complete: AtomicU64::new(0),
            last_logged_percentage: AtomicU32::new(0),
        }
    }

    /// Record `delta` completed units.
    pub fn update(&self, delta: u64) {
        if delta == 0 {
            return;
        }
        let num_complete = self.num_complete.fetch_add(delta, Ordering::Relaxed) + delta;
        let capped = num_complete.min(self.total);
        // Widened so huge totals cannot overflow the multiply.
        let new_percentage = if self.total == 0 {
            100
        } else {
            (capped as u128 * 100 / self.total as u128) as u32
        };

        let mut last_logged = self.last_logged_percentage.load(Ordering::Relaxed);
        loop {
            if new_percentage <= last_logged {
                // A racing update already covered this percentage and owns
                // its log line.
                return;
            }
            let crossed_step = new_percentage - last_logged >= self.update_period.max(1);
            if !crossed_step && new_percentage < 100 {
                return;
            }
            // Whichever thread moves the marker owns the log line. A loser
            // re-checks against the winner's value rather than skipping, so
            // the line for reaching the total is never dropped.
            match self.last_logged_percentage.compare_exchange(
                last_logged,
                new_percentage,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    debug!(
                        "{}: {new_percentage}% Complete ({capped} out of {})",
                        self.label, self.total
                    );
                    return;
                }
                Err(current) => last_logged = current,
            }
        }
    }

    /// Whether the running total has reached the target.
    pub fn done(&self) -> bool {
        self.num_complete.load(Ordering::Relaxed) >= self.total
    }

    /// Completed units so far (may exceed the total if callers over-report).
    pub fn num_complete(&self) -> u64 {
        self.num_complete.load(Ordering::Relaxed)
    }

    /// The target unit count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Units still outstanding.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.num_complete())
    }
}
