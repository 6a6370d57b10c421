//! Purpose-keyed deferred tasks
//!
//! One outstanding task per purpose: scheduling again replaces the pending
//! deadline instead of stacking a duplicate. Callers poll the service from
//! the frame tick and must re-check the precondition a task assumed when it
//! was scheduled, since the world may have moved on by the time it fires.

/// What a deferred task is for. Doubles as its cancellation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Auto-hide the tap hint if the player never collects anything.
    TapHintHide,
    /// End the counter's bump pulse.
    CounterBumpEnd,
    /// Staged celebration burst waves (1-based stage index).
    CelebrationStage(u8),
}

#[derive(Debug, Clone)]
struct TimerEntry {
    purpose: TimerPurpose,
    remaining: f32,
}

/// Single-threaded deferred-task queue, advanced by the frame tick.
#[derive(Debug, Clone, Default)]
pub struct TimerService {
    entries: Vec<TimerEntry>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `purpose` to fire after `delay` seconds, replacing any
    /// pending task with the same purpose.
    pub fn schedule(&mut self, purpose: TimerPurpose, delay: f32) {
        self.cancel(purpose);
        self.entries.push(TimerEntry {
            purpose,
            remaining: delay.max(0.0),
        });
    }

    pub fn cancel(&mut self, purpose: TimerPurpose) {
        self.entries.retain(|e| e.purpose != purpose);
    }

    pub fn is_scheduled(&self, purpose: TimerPurpose) -> bool {
        self.entries.iter().any(|e| e.purpose == purpose)
    }

    /// Advance all deadlines and drain the tasks that came due, in the order
    /// they were scheduled.
    pub fn poll(&mut self, dt: f32) -> Vec<TimerPurpose> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            entry.remaining -= dt;
        }
        self.entries.retain(|e| {
            if e.remaining <= 0.0 {
                due.push(e.purpose);
                false
            } else {
                true
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_delay() {
        let mut timers = TimerService::new();
        timers.schedule(TimerPurpose::TapHintHide, 1.0);

        assert!(timers.poll(0.5).is_empty());
        assert_eq!(timers.poll(0.6), vec![TimerPurpose::TapHintHide]);
        assert!(timers.poll(10.0).is_empty());
    }

    #[test]
    fn rescheduling_replaces_instead_of_stacking() {
        let mut timers = TimerService::new();
        timers.schedule(TimerPurpose::TapHintHide, 0.2);
        timers.schedule(TimerPurpose::TapHintHide, 5.0);

        // The first deadline was replaced, so nothing fires early...
        assert!(timers.poll(1.0).is_empty());
        // ...and only one task fires at the new deadline.
        assert_eq!(timers.poll(4.5), vec![TimerPurpose::TapHintHide]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut timers = TimerService::new();
        timers.schedule(TimerPurpose::CounterBumpEnd, 0.1);
        timers.cancel(TimerPurpose::CounterBumpEnd);
        assert!(timers.poll(1.0).is_empty());
    }

    #[test]
    fn distinct_purposes_fire_in_schedule_order() {
        let mut timers = TimerService::new();
        timers.schedule(TimerPurpose::CelebrationStage(1), 0.26);
        timers.schedule(TimerPurpose::CelebrationStage(2), 0.52);
        assert!(timers.is_scheduled(TimerPurpose::CelebrationStage(1)));

        let due = timers.poll(1.0);
        assert_eq!(
            due,
            vec![
                TimerPurpose::CelebrationStage(1),
                TimerPurpose::CelebrationStage(2)
            ]
        );
    }
}
