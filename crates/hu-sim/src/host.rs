//! Host frame budget.
//!
//! Converts wall time into a number of fixed physics ticks. Wall time per
//! frame is capped so a stalled host does not come back to a burst of
//! catch-up work, and ticks per frame are bounded; budget a frame cannot
//! spend carries to the next one, up to one frame's worth of ticks.

use crate::config::TimeBudgetConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBudget {
    pub multiplier: f64,
    /// Simulated seconds owed but not yet ticked.
    pub pending_s: f64,
    pub limits: TimeBudgetConfig,
}

/// Work done in one host frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub ticks: usize,
    pub simulated_s: f64,
    /// Budget left for the next frame (s).
    pub carried_s: f64,
    /// Wall time dropped by the stall cap (s).
    pub dropped_wall_s: f64,
}

impl TimeBudget {
    pub fn new(limits: TimeBudgetConfig) -> Self {
        Self {
            multiplier: 1.0,
            pending_s: 0.0,
            limits,
        }
    }

    /// Largest backlog kept between frames (simulated s).
    pub fn max_backlog_s(&self, dt_s: f64) -> f64 {
        self.limits.max_ticks_per_frame as f64 * dt_s
    }

    /// Credit `wall_s` of host time and return the ticks to run now.
    pub fn begin_frame(&mut self, wall_s: f64, dt_s: f64) -> FrameReport {
        let wall = wall_s.max(0.0);
        let credited = wall.min(self.limits.max_frame_wall_s);
        self.pending_s = (self.pending_s + credited * self.multiplier)
            .min(self.max_backlog_s(dt_s) + self.limits.max_frame_wall_s * self.multiplier);

        let affordable = (self.pending_s / dt_s + 1e-9).floor() as usize;
        let ticks = affordable.min(self.limits.max_ticks_per_frame);
        let simulated_s = ticks as f64 * dt_s;
        self.pending_s = (self.pending_s - simulated_s)
            .max(0.0)
            .min(self.max_backlog_s(dt_s));
        FrameReport {
            ticks,
            simulated_s,
            carried_s: self.pending_s,
            dropped_wall_s: wall - credited,
        }
    }

    pub fn reset(&mut self) {
        self.pending_s = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(multiplier: f64) -> TimeBudget {
        TimeBudget {
            multiplier,
            ..TimeBudget::new(TimeBudgetConfig::default())
        }
    }

    #[test]
    fn real_time_runs_one_tick_per_second() {
        let mut b = budget(1.0);
        let mut ticks = 0;
        for _ in 0..100 {
            ticks += b.begin_frame(0.1, 1.0).ticks;
        }
        assert_eq!(ticks, 10);
    }

    #[test]
    fn accelerated_frames_are_bounded_and_carry() {
        let mut b = budget(1_000.0);
        let first = b.begin_frame(0.5, 1.0);
        // 500 simulated seconds owed, exactly one frame of ticks
        assert_eq!(first.ticks, 500);
        assert!(first.carried_s.abs() < 1e-9);

        let mut b = budget(1_000.0);
        b.limits.max_ticks_per_frame = 100;
        let first = b.begin_frame(0.5, 1.0);
        assert_eq!(first.ticks, 100);
        assert!(first.carried_s > 0.0);
        let second = b.begin_frame(0.0, 1.0);
        assert_eq!(second.ticks, 100);
    }

    #[test]
    fn stall_is_capped() {
        let mut b = budget(10.0);
        let report = b.begin_frame(30.0, 1.0);
        assert!((report.dropped_wall_s - 29.5).abs() < 1e-9);
        assert_eq!(report.ticks, 5);
    }

    #[test]
    fn fractional_budget_accumulates() {
        let mut b = budget(1.0);
        assert_eq!(b.begin_frame(0.25, 0.5).ticks, 0);
        assert_eq!(b.begin_frame(0.25, 0.5).ticks, 1);
    }
}
