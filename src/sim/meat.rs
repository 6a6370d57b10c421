//! Falling meat props
//!
//! Props are pooled (see [`super::pool`]) and spawned three ways: the steady
//! rain ahead of the runners while in run mode, the celebration bursts, and
//! the victory rain emitter. A prop's render node is tagged with its stable
//! [`PropId`] at creation, so pointer picks resolve through the id instead of
//! scene-graph back-pointers.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pool::{Pool, PoolSlot};
use crate::consts::*;

/// Stable identity of a pooled prop, minted once per slot and kept across
/// recycles. The presenter tags the prop's render node with it for picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeatProp {
    pub id: PropId,
    pub active: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler spin rates (rad/s) and accumulated rotation.
    pub spin: Vec3,
    pub rotation: Vec3,
    /// Seconds left to live; 0 means bounds-culled only.
    pub ttl: f32,
    pub golden: bool,
}

impl MeatProp {
    fn parked(id: PropId) -> Self {
        Self {
            id,
            active: false,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            spin: Vec3::ZERO,
            rotation: Vec3::ZERO,
            ttl: 0.0,
            golden: false,
        }
    }
}

impl PoolSlot for MeatProp {
    fn is_active(&self) -> bool {
        self.active
    }
    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Kinematic parameters for one spawn.
#[derive(Debug, Clone, Copy)]
pub struct PropSpawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub ttl: f32,
}

/// Victory-rain kinematics: high above the road, drifting ahead.
const RAIN_HEIGHT_MIN: f32 = 16.0;
const RAIN_HEIGHT_MAX: f32 = 26.0;
const RAIN_AHEAD_MIN: f32 = 12.0;
const RAIN_AHEAD_MAX: f32 = 34.0;
const RAIN_FALL_MIN: f32 = 10.0;
const RAIN_FALL_MAX: f32 = 20.0;

/// Celebration-burst kinematics: flung upward from road level.
const BURST_HALF_WIDTH: f32 = 3.25;
const BURST_AHEAD_MIN: f32 = 10.0;
const BURST_AHEAD_MAX: f32 = 26.0;
const BURST_UP_MIN: f32 = 10.0;
const BURST_UP_MAX: f32 = 22.0;

impl PropSpawn {
    /// Steady run-phase drop ahead of the leader.
    pub fn falling(leader_z: f32, rng: &mut Pcg32) -> Self {
        Self {
            position: Vec3::new(
                rng.random_range(-MEAT_SPAWN_HALF_WIDTH..=MEAT_SPAWN_HALF_WIDTH),
                MEAT_SPAWN_HEIGHT + rng.random_range(0.0..=MEAT_SPAWN_HEIGHT_JITTER),
                leader_z - rng.random_range(MEAT_SPAWN_AHEAD_MIN..=MEAT_SPAWN_AHEAD_MAX),
            ),
            velocity: Vec3::new(
                0.0,
                -rng.random_range(MEAT_FALL_SPEED_MIN..=MEAT_FALL_SPEED_MAX),
                0.0,
            ),
            ttl: 0.0,
        }
    }

    /// Victory-rain drop: spawned by the rain emitter while it is live.
    pub fn rain(leader_z: f32, rng: &mut Pcg32) -> Self {
        let half_width = ROAD_WIDTH * 1.15 * 0.5;
        Self {
            position: Vec3::new(
                rng.random_range(-half_width..=half_width),
                rng.random_range(RAIN_HEIGHT_MIN..=RAIN_HEIGHT_MAX),
                leader_z - rng.random_range(RAIN_AHEAD_MIN..=RAIN_AHEAD_MAX),
            ),
            velocity: Vec3::new(
                rng.random_range(-0.4..=0.4),
                -rng.random_range(RAIN_FALL_MIN..=RAIN_FALL_MAX),
                -rng.random_range(0.0..=1.6),
            ),
            ttl: rng.random_range(3.2..=4.4),
        }
    }

    /// Celebration burst: thrown up from near the road ahead of the leader.
    pub fn burst(leader_z: f32, spread_mul: f32, rng: &mut Pcg32) -> Self {
        Self {
            position: Vec3::new(
                rng.random_range(-BURST_HALF_WIDTH..=BURST_HALF_WIDTH) * spread_mul,
                1.0 + rng.random_range(0.0..=1.5),
                leader_z - rng.random_range(BURST_AHEAD_MIN..=BURST_AHEAD_MAX),
            ),
            velocity: Vec3::new(
                rng.random_range(-1.8..=1.8) * spread_mul,
                rng.random_range(BURST_UP_MIN..=BURST_UP_MAX),
                -rng.random_range(0.0..=4.6),
            ),
            ttl: rng.random_range(2.6..=3.5),
        }
    }
}

/// The pooled prop collection plus its rate emitter.
#[derive(Debug, Clone)]
pub struct MeatField {
    pool: Pool<MeatProp>,
    next_id: u32,
    spawn_acc: f32,
    spawning: bool,
}

impl Default for MeatField {
    fn default() -> Self {
        Self::new(MEAT_POOL_CAPACITY)
    }
}

impl MeatField {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::new(capacity),
            next_id: 1,
            spawn_acc: 0.0,
            spawning: false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeatProp> {
        self.pool.iter()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn spawning(&self) -> bool {
        self.spawning
    }

    /// Toggle the run-phase emitter. Turning it on restarts the accumulator
    /// so a long walk phase can't bank fractional spawns.
    pub fn set_spawning(&mut self, on: bool) {
        if on && !self.spawning {
            self.spawn_acc = 0.0;
        }
        self.spawning = on;
    }

    /// Activate a pool slot with fresh spawn state. Every field except the
    /// stable id is overwritten, so recycled slots carry nothing over.
    pub fn spawn(&mut self, spawn: PropSpawn, rng: &mut Pcg32) -> PropId {
        let golden = rng.random_bool(GOLDEN_CHANCE);
        let rotation = Vec3::new(
            rng.random_range(0.0..=std::f32::consts::PI),
            rng.random_range(0.0..=std::f32::consts::PI),
            rng.random_range(0.0..=std::f32::consts::PI),
        );
        let spin = Vec3::new(
            rng.random_range(-MEAT_SPIN_SPEED_MAX..=MEAT_SPIN_SPEED_MAX),
            rng.random_range(-MEAT_SPIN_SPEED_MAX..=MEAT_SPIN_SPEED_MAX),
            rng.random_range(-MEAT_SPIN_SPEED_MAX..=MEAT_SPIN_SPEED_MAX),
        );

        let fresh_id = self.next_id;
        let slot = self.pool.acquire_with(|| MeatProp::parked(PropId(fresh_id)));
        if slot.id.0 == fresh_id {
            self.next_id += 1;
        }
        slot.active = true;
        slot.position = spawn.position;
        slot.velocity = spawn.velocity;
        slot.ttl = spawn.ttl;
        slot.rotation = rotation;
        slot.spin = spin;
        slot.golden = golden;
        slot.id
    }

    /// Emitter + physics + lifetime/bounds culling for every active prop.
    pub fn update(&mut self, dt: f32, leader_z: f32, mid_z: f32, camera_z: f32, rng: &mut Pcg32) {
        if self.spawning {
            self.spawn_acc += dt * MEAT_SPAWN_PER_SEC;
            while self.spawn_acc >= 1.0 {
                self.spawn_acc -= 1.0;
                let spawn = PropSpawn::falling(leader_z, rng);
                self.spawn(spawn, rng);
            }
        }

        let behind_z = camera_z + MEAT_BEHIND_CAMERA;
        for prop in self.pool.iter_mut() {
            if !prop.active {
                continue;
            }
            prop.position += prop.velocity * dt;
            prop.rotation += prop.spin * dt;

            if prop.ttl > 0.0 {
                prop.ttl -= dt;
                if prop.ttl <= 0.0 {
                    prop.deactivate();
                    continue;
                }
            }

            // Below ground, over the sky bound, behind the camera, or far
            // from the actors: release the slot for reuse.
            if prop.position.y < MEAT_KILL_Y
                || prop.position.y > MEAT_CEILING_Y
                || prop.position.z > behind_z
                || (prop.position.z - mid_z).abs() > MEAT_FAR_CULL
            {
                prop.deactivate();
            }
        }
    }

    /// Collect the tapped prop, or any active prop when the tap missed.
    /// Returns the collected prop's base value and golden flag, or None when
    /// nothing is active.
    pub fn collect(&mut self, hit: Option<PropId>, rng: &mut Pcg32) -> Option<(u32, bool)> {
        let hit_index = hit.and_then(|id| self.pool.iter().position(|p| p.active && p.id == id));
        let prop = match hit_index {
            Some(i) => self.pool.get_mut(i),
            None => self.pool.first_active_mut(),
        }?;

        prop.deactivate();
        let golden = prop.golden;
        let base = rng.random_range(MEAT_VALUE_MIN..=MEAT_VALUE_MAX);
        Some((base, golden))
    }
}
