//! World state and mode transitions
//!
//! Everything the frame scheduler mutates lives in one [`WorldState`] owned
//! by the caller and passed down to each subsystem, so there are no hidden
//! globals and every field has a single writer: the motion integrator owns
//! actor positions, the recycler owns segment positions, and so on.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::CameraRig;
use super::combo::{CollectOutcome, ScoreState};
use super::effects::EffectField;
use super::meat::{MeatField, PropId, PropSpawn};
use super::motion::{ActorPair, ActorRole, MotionMode};
use super::road::RoadRibbon;
use crate::settings::SceneSettings;
use crate::timers::{TimerPurpose, TimerService};

/// Celebration staging: an immediate wave, then two delayed follow-ups.
const CELEBRATION_WAVE_NOW: usize = 64;
const CELEBRATION_WAVE_NOW_REDUCED: usize = 34;
const CELEBRATION_STAGE2_DELAY: f32 = 0.26;
const CELEBRATION_STAGE2_COUNT: usize = 38;
const CELEBRATION_STAGE2_SPREAD: f32 = 1.15;
const CELEBRATION_STAGE3_DELAY: f32 = 0.52;
const CELEBRATION_STAGE3_COUNT: usize = 34;
const CELEBRATION_STAGE3_SPREAD: f32 = 1.25;
const VICTORY_RAIN_SECS: f32 = 4.0;

/// Things that happened during a tick that the presentation layers react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    ModeChanged(MotionMode),
    Collected(CollectOutcome),
    /// The combo decay window lapsed with no new collection.
    StreakLapsed,
    /// The score target was crossed for the first (and only) time.
    CelebrationStarted,
}

/// The whole mutable scene, advanced by [`super::tick::step`].
#[derive(Debug, Clone)]
pub struct WorldState {
    /// None until the script sets the first mode; transitions are
    /// edge-triggered through [`WorldState::set_mode`].
    pub mode: Option<MotionMode>,
    pub actors: ActorPair,
    pub camera: CameraRig,
    pub road: RoadRibbon,
    pub meat: MeatField,
    pub fx: EffectField,
    pub score: ScoreState,
    pub timers: TimerService,
    pub settings: SceneSettings,
    pub rng: Pcg32,
    /// Simulated seconds since the loop started.
    pub elapsed: f64,
}

impl WorldState {
    pub fn new(seed: u64, settings: SceneSettings) -> Self {
        let actors = ActorPair::new();
        let road = RoadRibbon::new(actors.reference_z());
        Self {
            mode: None,
            actors,
            camera: CameraRig::new(),
            road,
            meat: MeatField::default(),
            fx: EffectField::new(),
            score: ScoreState::new(),
            timers: TimerService::new(),
            settings,
            rng: Pcg32::seed_from_u64(seed),
            elapsed: 0.0,
        }
    }

    /// Switch locomotion mode. Only a real change acts: repeat calls with the
    /// current mode fire no side effects. Entering run resets the score and
    /// streak, arms the prop emitter, swaps animation clips, and triggers the
    /// run-entry effects.
    pub fn set_mode(&mut self, mode: MotionMode, events: &mut Vec<WorldEvent>) {
        if self.mode == Some(mode) {
            return;
        }
        self.mode = Some(mode);
        self.meat
            .set_spawning(self.settings.meat_enabled && mode == MotionMode::Run);

        self.actors.leader.apply_mode(mode);
        self.actors.follower.apply_mode(mode);

        if mode == MotionMode::Run {
            self.score.begin_run();
            let follower_z = self.actors.reference_z();
            if self.settings.birds_at_run_start() {
                self.fx.trigger_bird_flyover(follower_z, &mut self.rng);
            }
            if self.settings.halo_burst_at_run_start() {
                self.fx.spawn_halo(ActorRole::Leader);
                self.fx.spawn_halo(ActorRole::Follower);
                self.fx.trigger_run_blast(follower_z, &mut self.rng);
            }
        }
        events.push(WorldEvent::ModeChanged(mode));
    }

    /// A pointer tap during the run: collect the hit prop (or any active one)
    /// and score it. Taps outside run mode, or with the minigame disabled,
    /// do nothing.
    pub fn tap(&mut self, hit: Option<PropId>, events: &mut Vec<WorldEvent>) {
        if self.mode != Some(MotionMode::Run) || !self.settings.counter_enabled {
            return;
        }
        let Some((base, golden)) = self.meat.collect(hit, &mut self.rng) else {
            return;
        };
        let outcome = self.score.collect(base, golden);
        events.push(WorldEvent::Collected(outcome));
        if outcome.celebration {
            events.push(WorldEvent::CelebrationStarted);
            self.start_celebration();
        }
    }

    fn start_celebration(&mut self) {
        let reduced = self.settings.reduced_motion;
        let now = if reduced {
            CELEBRATION_WAVE_NOW_REDUCED
        } else {
            CELEBRATION_WAVE_NOW
        };
        self.celebration_wave(now, 1.0);
        if !reduced {
            self.timers
                .schedule(TimerPurpose::CelebrationStage(1), CELEBRATION_STAGE2_DELAY);
            self.timers
                .schedule(TimerPurpose::CelebrationStage(2), CELEBRATION_STAGE3_DELAY);
        }
        if self.settings.victory_rain() {
            self.fx.start_victory_rain(VICTORY_RAIN_SECS);
        }
    }

    fn celebration_wave(&mut self, count: usize, spread_mul: f32) {
        let leader_z = self.actors.leader_z();
        for _ in 0..count {
            let spawn = PropSpawn::burst(leader_z, spread_mul, &mut self.rng);
            self.meat.spawn(spawn, &mut self.rng);
        }
    }

    /// Run a due deferred task. Each body re-checks its precondition rather
    /// than trusting the state it was scheduled under.
    pub(crate) fn fire_timer(&mut self, purpose: TimerPurpose) {
        match purpose {
            TimerPurpose::CelebrationStage(1) => {
                if self.score.celebrated() {
                    self.celebration_wave(CELEBRATION_STAGE2_COUNT, CELEBRATION_STAGE2_SPREAD);
                }
            }
            TimerPurpose::CelebrationStage(_) => {
                if self.score.celebrated() {
                    self.celebration_wave(CELEBRATION_STAGE3_COUNT, CELEBRATION_STAGE3_SPREAD);
                }
            }
            // HUD purposes live in the UI director's own service.
            TimerPurpose::TapHintHide | TimerPurpose::CounterBumpEnd => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldState {
        WorldState::new(42, SceneSettings::default())
    }

    #[test]
    fn mode_entry_side_effects_fire_once() {
        let mut w = world();
        let mut events = Vec::new();

        w.set_mode(MotionMode::Walk, &mut events);
        w.set_mode(MotionMode::Run, &mut events);
        let birds_after_entry = w.fx.birds.len();
        assert_eq!(birds_after_entry, 9);
        assert_eq!(w.fx.halos.len(), 2);
        assert!(w.meat.spawning());

        // A second run request is a no-op: no event, no second flock.
        w.set_mode(MotionMode::Run, &mut events);
        assert_eq!(w.fx.birds.len(), birds_after_entry);
        let mode_changes = events
            .iter()
            .filter(|e| matches!(e, WorldEvent::ModeChanged(MotionMode::Run)))
            .count();
        assert_eq!(mode_changes, 1);
    }

    #[test]
    fn entering_run_resets_score_and_streak() {
        let mut w = world();
        let mut events = Vec::new();
        w.score.collect(10, false);
        assert!(w.score.total > 0);

        w.set_mode(MotionMode::Run, &mut events);
        assert_eq!(w.score.total, 0);
        assert_eq!(w.score.combo.count(), 0);
    }

    #[test]
    fn taps_outside_run_mode_do_nothing() {
        let mut w = world();
        let mut events = Vec::new();
        w.set_mode(MotionMode::Walk, &mut events);
        w.tap(None, &mut events);
        assert!(!events.iter().any(|e| matches!(e, WorldEvent::Collected(_))));
    }

    #[test]
    fn run_tap_never_noops_while_a_prop_is_active() {
        let mut w = world();
        let mut events = Vec::new();
        w.set_mode(MotionMode::Run, &mut events);
        let spawn = PropSpawn::falling(w.actors.leader_z(), &mut w.rng);
        w.meat.spawn(spawn, &mut w.rng);

        // A tap with a bogus hit id still collects the active prop.
        w.tap(Some(PropId(4040)), &mut events);
        assert!(events.iter().any(|e| matches!(e, WorldEvent::Collected(_))));
        assert_eq!(w.meat.active_count(), 0);
    }

    #[test]
    fn celebration_spawns_waves_and_rain_once() {
        let mut w = world();
        let mut events = Vec::new();
        w.set_mode(MotionMode::Run, &mut events);
        w.score.target = 1;

        let spawn = PropSpawn::falling(0.0, &mut w.rng);
        w.meat.spawn(spawn, &mut w.rng);
        w.tap(None, &mut events);

        assert!(events.iter().any(|e| *e == WorldEvent::CelebrationStarted));
        assert!(w.fx.rain_active());
        assert!(w.timers.is_scheduled(TimerPurpose::CelebrationStage(1)));
        assert!(w.timers.is_scheduled(TimerPurpose::CelebrationStage(2)));
        // The immediate wave is live in the pool.
        assert_eq!(w.meat.active_count(), CELEBRATION_WAVE_NOW);

        // Further collections never re-trigger.
        events.clear();
        let spawn = PropSpawn::falling(0.0, &mut w.rng);
        w.meat.spawn(spawn, &mut w.rng);
        w.tap(None, &mut events);
        assert!(!events.iter().any(|e| *e == WorldEvent::CelebrationStarted));
    }

    #[test]
    fn reduced_motion_trims_the_celebration() {
        let settings = SceneSettings {
            reduced_motion: true,
            ..SceneSettings::default()
        };
        let mut w = WorldState::new(7, settings);
        let mut events = Vec::new();
        w.set_mode(MotionMode::Run, &mut events);
        // No flyover or halos under reduced motion.
        assert!(w.fx.birds.is_empty());
        assert!(w.fx.halos.is_empty());

        w.score.target = 1;
        let spawn = PropSpawn::falling(0.0, &mut w.rng);
        w.meat.spawn(spawn, &mut w.rng);
        w.tap(None, &mut events);

        assert!(!w.fx.rain_active());
        assert!(!w.timers.is_scheduled(TimerPurpose::CelebrationStage(1)));
        // Single smaller wave only.
        assert_eq!(w.meat.active_count(), CELEBRATION_WAVE_NOW_REDUCED);
    }
}
