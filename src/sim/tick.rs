//! Frame scheduling
//!
//! One [`step`] per display refresh, with the raw timestamp delta clamped so
//! a backgrounded tab resumes with a normal-sized tick instead of a lurch.
//! Subsystem order inside a tick is fixed: animation, motion, camera, road,
//! props, effects, timers. Later steps read the post-motion positions the
//! earlier steps wrote, so nothing ever observes a half-updated world.

use super::meat::PropId;
use super::motion::MotionMode;
use super::state::{WorldEvent, WorldState};
use crate::consts::FRAME_CAP;

/// A pointer tap routed into the simulation. `hit` carries the prop id the
/// host's picking found under the pointer, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapInput {
    pub hit: Option<PropId>,
}

/// Everything the outside world feeds into one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub tap: Option<TapInput>,
}

impl FrameInput {
    pub fn tapped(hit: Option<PropId>) -> Self {
        Self {
            tap: Some(TapInput { hit }),
        }
    }
}

/// Turns raw monotonic timestamps into clamped simulation deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The very first call only records the timestamp and yields no delta,
    /// so the opening frame never simulates the whole load time. Afterwards
    /// the delta is clamped to [`FRAME_CAP`].
    pub fn delta(&mut self, now_secs: f64) -> Option<f32> {
        let dt = self
            .last
            .map(|prev| ((now_secs - prev) as f32).clamp(0.0, FRAME_CAP));
        self.last = Some(now_secs);
        dt
    }
}

/// Advance the whole world by one clamped tick.
pub fn step(world: &mut WorldState, input: &FrameInput, dt: f32) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    world.elapsed += dt as f64;

    // Animation channels first so pose time matches this tick's motion.
    world.actors.advance_animation(dt);

    // Forward motion; the scene idles until the script picks the first mode.
    if let Some(mode) = world.mode {
        world.actors.integrate(mode, dt);
    }

    // Camera and road both key on the post-motion reference.
    world
        .camera
        .update(world.mode.unwrap_or(MotionMode::Walk), &world.actors);
    world.road.recycle(world.actors.reference_z());

    // Prop field: taps land before physics so a collected prop never gets a
    // posthumous integration step.
    if let Some(tap) = &input.tap {
        world.tap(tap.hit, &mut events);
    }
    let leader_z = world.actors.leader_z();
    let (_, mid_z) = world.actors.midpoint();
    let camera_z = world.camera.eye.z;
    world.meat.update(dt, leader_z, mid_z, camera_z, &mut world.rng);

    // Transient effects (the rain emitter may spawn more props).
    world
        .fx
        .update(dt, &world.actors, &mut world.meat, &mut world.rng);

    // Timer-driven systems: combo decay and deferred celebration stages.
    if world.score.combo.tick(dt) {
        events.push(WorldEvent::StreakLapsed);
    }
    for purpose in world.timers.poll(dt) {
        world.fire_timer(purpose);
    }

    events
}
