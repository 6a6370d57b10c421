//! HUD direction
//!
//! The DOM is a collaborator behind the [`Hud`] trait; this module decides
//! what it shows and when. Auto-hide and pulse timing run through the
//! purpose-keyed timer service, so re-showing a hint replaces its pending
//! hide instead of stacking a second one, and every fired task tolerates the
//! element having moved on in the meantime.

use crate::script::ScriptCue;
use crate::sim::motion::MotionMode;
use crate::sim::state::WorldEvent;
use crate::timers::{TimerPurpose, TimerService};

/// The tap hint gives up after this long without a collection.
const TAP_HINT_SECS: f32 = 12.0;
/// Length of the counter's pop animation.
const COUNTER_BUMP_SECS: f32 = 0.14;

/// Narrow interface over the DOM HUD elements. All calls are idempotent.
pub trait Hud {
    /// Show the loader overlay with the given text; None hides it.
    fn set_loading(&mut self, text: Option<&str>);
    /// Swap the crawl to a new reference + line (restarting its animation).
    fn set_verse(&mut self, reference: &str, line: &str);
    fn set_sound_hint(&mut self, visible: bool);
    fn set_tap_hint(&mut self, visible: bool);
    fn set_counter_visible(&mut self, visible: bool);
    fn set_counter(&mut self, value: u32);
    /// Pulse animation on the counter while true.
    fn set_counter_bump(&mut self, active: bool);
    /// Current streak multiplier (1 = no streak).
    fn set_combo(&mut self, multiplier: u32);
    fn show_victory(&mut self);
}

/// Drives a [`Hud`] from script cues and world events.
pub struct UiDirector {
    timers: TimerService,
    counter_enabled: bool,
    tap_hint_dismissed: bool,
    sound_hint_shown: bool,
}

impl UiDirector {
    pub fn new(counter_enabled: bool) -> Self {
        Self {
            timers: TimerService::new(),
            counter_enabled,
            tap_hint_dismissed: false,
            sound_hint_shown: false,
        }
    }

    /// Script-side cues: only the text swaps concern the HUD.
    pub fn handle_cue(&mut self, cue: &ScriptCue, hud: &mut dyn Hud) {
        if let ScriptCue::ShowText { reference, line } = cue {
            hud.set_verse(reference, line);
        }
    }

    /// Simulation events from this tick.
    pub fn handle_event(&mut self, event: &WorldEvent, hud: &mut dyn Hud) {
        match event {
            WorldEvent::ModeChanged(MotionMode::Run) => {
                if self.counter_enabled {
                    hud.set_counter(0);
                    hud.set_combo(1);
                    hud.set_counter_visible(true);
                    self.bump(hud);
                    // A fresh run gets a fresh chance at the hint.
                    self.tap_hint_dismissed = false;
                    self.show_tap_hint(hud);
                }
            }
            WorldEvent::ModeChanged(MotionMode::Walk) => {}
            WorldEvent::Collected(outcome) => {
                self.dismiss_tap_hint(hud);
                hud.set_counter(outcome.total);
                hud.set_combo(outcome.multiplier);
                self.bump(hud);
            }
            WorldEvent::StreakLapsed => hud.set_combo(1),
            WorldEvent::CelebrationStarted => {
                hud.show_victory();
                self.bump(hud);
            }
        }
    }

    /// Mirror the audio director's blocked state into the passive hint.
    pub fn sync_sound_hint(&mut self, visible: bool, hud: &mut dyn Hud) {
        if visible != self.sound_hint_shown {
            self.sound_hint_shown = visible;
            hud.set_sound_hint(visible);
        }
    }

    /// Advance the deferred HUD tasks.
    pub fn update(&mut self, dt: f32, hud: &mut dyn Hud) {
        for purpose in self.timers.poll(dt) {
            match purpose {
                // May fire after an explicit dismissal; hiding twice is fine.
                TimerPurpose::TapHintHide => hud.set_tap_hint(false),
                TimerPurpose::CounterBumpEnd => hud.set_counter_bump(false),
                TimerPurpose::CelebrationStage(_) => {}
            }
        }
    }

    fn bump(&mut self, hud: &mut dyn Hud) {
        hud.set_counter_bump(true);
        self.timers
            .schedule(TimerPurpose::CounterBumpEnd, COUNTER_BUMP_SECS);
    }

    fn show_tap_hint(&mut self, hud: &mut dyn Hud) {
        if self.tap_hint_dismissed {
            return;
        }
        hud.set_tap_hint(true);
        self.timers.schedule(TimerPurpose::TapHintHide, TAP_HINT_SECS);
    }

    fn dismiss_tap_hint(&mut self, hud: &mut dyn Hud) {
        self.tap_hint_dismissed = true;
        self.timers.cancel(TimerPurpose::TapHintHide);
        hud.set_tap_hint(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combo::CollectOutcome;

    #[derive(Default)]
    struct MockHud {
        loading: Option<String>,
        verse: Option<(String, String)>,
        sound_hint: bool,
        tap_hint: bool,
        counter_visible: bool,
        counter: u32,
        bump: bool,
        combo: u32,
        victories: u32,
        sound_hint_calls: u32,
    }

    impl Hud for MockHud {
        fn set_loading(&mut self, text: Option<&str>) {
            self.loading = text.map(str::to_owned);
        }
        fn set_verse(&mut self, reference: &str, line: &str) {
            self.verse = Some((reference.to_owned(), line.to_owned()));
        }
        fn set_sound_hint(&mut self, visible: bool) {
            self.sound_hint = visible;
            self.sound_hint_calls += 1;
        }
        fn set_tap_hint(&mut self, visible: bool) {
            self.tap_hint = visible;
        }
        fn set_counter_visible(&mut self, visible: bool) {
            self.counter_visible = visible;
        }
        fn set_counter(&mut self, value: u32) {
            self.counter = value;
        }
        fn set_counter_bump(&mut self, active: bool) {
            self.bump = active;
        }
        fn set_combo(&mut self, multiplier: u32) {
            self.combo = multiplier;
        }
        fn show_victory(&mut self) {
            self.victories += 1;
        }
    }

    fn collected(total: u32, multiplier: u32) -> WorldEvent {
        WorldEvent::Collected(CollectOutcome {
            gained: total,
            total,
            multiplier,
            golden: false,
            celebration: false,
        })
    }

    #[test]
    fn run_entry_arms_counter_and_tap_hint() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);

        ui.handle_event(&WorldEvent::ModeChanged(MotionMode::Run), &mut hud);
        assert!(hud.counter_visible);
        assert_eq!(hud.counter, 0);
        assert!(hud.tap_hint);
        assert!(hud.bump);
    }

    #[test]
    fn tap_hint_auto_hides_after_its_window() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);
        ui.handle_event(&WorldEvent::ModeChanged(MotionMode::Run), &mut hud);

        ui.update(TAP_HINT_SECS - 0.1, &mut hud);
        assert!(hud.tap_hint);
        ui.update(0.2, &mut hud);
        assert!(!hud.tap_hint);
    }

    #[test]
    fn collecting_dismisses_the_hint_for_good() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);
        ui.handle_event(&WorldEvent::ModeChanged(MotionMode::Run), &mut hud);

        ui.handle_event(&collected(12, 1), &mut hud);
        assert!(!hud.tap_hint);
        assert_eq!(hud.counter, 12);

        // The stale auto-hide deadline was cancelled, not left to re-fire.
        ui.update(TAP_HINT_SECS + 1.0, &mut hud);
        assert!(!hud.tap_hint);
    }

    #[test]
    fn bump_pulse_ends_on_schedule() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);
        ui.handle_event(&collected(5, 1), &mut hud);
        assert!(hud.bump);

        ui.update(COUNTER_BUMP_SECS + 0.01, &mut hud);
        assert!(!hud.bump);
    }

    #[test]
    fn streak_lapse_resets_the_combo_display() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);
        ui.handle_event(&collected(30, 3), &mut hud);
        assert_eq!(hud.combo, 3);

        ui.handle_event(&WorldEvent::StreakLapsed, &mut hud);
        assert_eq!(hud.combo, 1);
    }

    #[test]
    fn sound_hint_only_calls_through_on_change() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(true);
        ui.sync_sound_hint(true, &mut hud);
        ui.sync_sound_hint(true, &mut hud);
        ui.sync_sound_hint(false, &mut hud);
        assert_eq!(hud.sound_hint_calls, 2);
        assert!(!hud.sound_hint);
    }

    #[test]
    fn disabled_counter_keeps_the_minigame_hud_dark() {
        let mut hud = MockHud::default();
        let mut ui = UiDirector::new(false);
        ui.handle_event(&WorldEvent::ModeChanged(MotionMode::Run), &mut hud);
        assert!(!hud.counter_visible);
        assert!(!hud.tap_hint);
    }
}
