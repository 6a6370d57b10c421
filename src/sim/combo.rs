//! Collection streaks, score, and the one-time celebration latch
//!
//! Each collection bumps the streak and rearms a decay timer; the streak maps
//! to a capped, tiered score multiplier. Letting the timer lapse drops the
//! streak back to idle. The celebration fires the first time the running
//! total crosses the target and is latched for the rest of the session.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Consecutive-collection streak with a rolling decay window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboMeter {
    count: u32,
    decay_left: f32,
    step: u32,
    window: f32,
    max_multiplier: u32,
}

impl Default for ComboMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl ComboMeter {
    pub fn new() -> Self {
        Self::with_rules(COMBO_STEP, COMBO_MAX_MULTIPLIER, COMBO_WINDOW_SECS)
    }

    pub fn with_rules(step: u32, max_multiplier: u32, window: f32) -> Self {
        Self {
            count: 0,
            decay_left: 0.0,
            step,
            window,
            max_multiplier,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Tiered step function of the streak, capped.
    pub fn multiplier(&self) -> u32 {
        if self.count == 0 {
            1
        } else {
            (1 + self.count / self.step).min(self.max_multiplier)
        }
    }

    /// Record a collection: bump the streak, rearm the decay timer, and
    /// return the multiplier that applies to this collection.
    pub fn register(&mut self) -> u32 {
        self.count += 1;
        self.decay_left = self.window;
        self.multiplier()
    }

    /// Count the window down. Returns true if the streak lapsed this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.count == 0 {
            return false;
        }
        self.decay_left -= dt;
        if self.decay_left <= 0.0 {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.decay_left = 0.0;
    }
}

/// Result of scoring one collected prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOutcome {
    pub gained: u32,
    pub total: u32,
    pub multiplier: u32,
    pub golden: bool,
    /// True exactly once per session, when the total first crosses the target.
    pub celebration: bool,
}

/// Running score for the current session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreState {
    pub total: u32,
    pub target: u32,
    celebrated: bool,
    pub combo: ComboMeter,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreState {
    pub fn new() -> Self {
        Self {
            total: 0,
            target: SCORE_TARGET,
            celebrated: false,
            combo: ComboMeter::new(),
        }
    }

    pub fn celebrated(&self) -> bool {
        self.celebrated
    }

    /// Entering a run phase zeroes the counter and streak. The celebration
    /// latch survives; it never refires.
    pub fn begin_run(&mut self) {
        self.total = 0;
        self.combo.reset();
    }

    /// Score a collected prop: `base * golden bonus * streak multiplier`.
    pub fn collect(&mut self, base_value: u32, golden: bool) -> CollectOutcome {
        let multiplier = self.combo.register();
        let golden_bonus = if golden { GOLDEN_MULTIPLIER } else { 1 };
        let gained = base_value * golden_bonus * multiplier;
        self.total += gained;

        let celebration = !self.celebrated && self.total >= self.target;
        if celebration {
            self.celebrated = true;
        }
        CollectOutcome {
            gained,
            total: self.total,
            multiplier,
            golden,
            celebration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_lapses_after_the_window() {
        let mut combo = ComboMeter::with_rules(3, 10, 2.0);
        combo.register();
        combo.register();
        assert_eq!(combo.count(), 2);

        assert!(!combo.tick(1.9));
        assert!(combo.tick(0.2));
        assert_eq!(combo.count(), 0);
        assert_eq!(combo.multiplier(), 1);
    }

    #[test]
    fn collecting_just_inside_the_window_extends_the_streak() {
        let mut combo = ComboMeter::with_rules(3, 10, 2.0);
        combo.register();
        combo.tick(1.99);
        combo.register();
        assert_eq!(combo.count(), 2);
        // Window rearmed: another near-full wait still keeps the streak.
        combo.tick(1.99);
        assert_eq!(combo.count(), 2);
    }

    #[test]
    fn multiplier_tiers_step_and_cap() {
        let mut combo = ComboMeter::with_rules(3, 10, 60.0);
        for _ in 0..9 {
            combo.register();
        }
        assert_eq!(combo.multiplier(), 4);

        // Way past the cap.
        for _ in 0..100 {
            combo.register();
        }
        assert_eq!(combo.multiplier(), 10);
    }

    #[test]
    fn idle_meter_never_decays_below_idle() {
        let mut combo = ComboMeter::new();
        assert!(!combo.tick(100.0));
        assert_eq!(combo.multiplier(), 1);
    }

    #[test]
    fn score_applies_golden_and_streak_multipliers() {
        let mut score = ScoreState::new();
        let first = score.collect(10, false);
        assert_eq!(first.gained, 10);
        assert_eq!(first.multiplier, 1);

        // Streak up to the second tier.
        score.collect(1, false);
        score.collect(1, false);
        let fourth = score.collect(10, true);
        assert_eq!(fourth.multiplier, 2);
        assert_eq!(fourth.gained, 10 * GOLDEN_MULTIPLIER * 2);
    }

    #[test]
    fn celebration_fires_exactly_once() {
        let mut score = ScoreState::new();
        let big = score.target;
        let hit = score.collect(big, false);
        assert!(hit.celebration);
        assert!(score.celebrated());

        let after = score.collect(big, false);
        assert!(!after.celebration);

        // A fresh run keeps the latch.
        score.begin_run();
        assert_eq!(score.total, 0);
        let again = score.collect(big, false);
        assert!(!again.celebration);
    }
}
