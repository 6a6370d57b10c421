//! Short-lived visual effects
//!
//! Each effect is an independent finite-lifetime state machine ticked by the
//! frame scheduler: spawned by a discrete trigger, alive while its life
//! counter runs down a deterministic animation curve, removed the tick it
//! expires. Nothing outside this module holds a reference to a live effect.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::meat::{MeatField, PropSpawn};
use super::motion::{ActorPair, ActorRole};

const BIRD_FLOCK_SIZE: usize = 9;
const BIRD_SIDE_X: f32 = 10.5;
const BIRD_FLAP_RATE: f32 = 10.5;
const BIRD_FLAP_SWING: f32 = 0.55;

const HALO_TTL: f32 = 1.15;
const HALO_HOVER: f32 = 2.35;
const HALO_FADE_IN: f32 = 0.18;
const HALO_FADE_OUT: f32 = 0.35;
const HALO_PEAK_ALPHA: f32 = 0.85;

const BLAST_PARTICLES: usize = 96;
const BLAST_TTL: f32 = 0.95;

const RAIN_RATE: f32 = 46.0;

/// One bird of the run-start flyover.
#[derive(Debug, Clone)]
pub struct Bird {
    pub position: Vec3,
    vx: f32,
    vz: f32,
    phase: f32,
    pub scale: f32,
    /// Facing, derived from the crossing velocity at spawn.
    pub heading: f32,
    life: f32,
}

impl Bird {
    /// Wing deflection for the presenter (left wing; right is mirrored).
    pub fn flap_angle(&self) -> f32 {
        self.phase.sin() * BIRD_FLAP_SWING
    }
}

/// Glowing ring hovering over an actor.
#[derive(Debug, Clone)]
pub struct Halo {
    pub target: ActorRole,
    pub position: Vec3,
    pub alpha: f32,
    pub scale: f32,
    pub spin: f32,
    life: f32,
}

#[derive(Debug, Clone)]
pub struct BurstParticle {
    pub offset: Vec3,
    velocity: Vec3,
}

/// Radial particle blast fired once at run start.
#[derive(Debug, Clone)]
pub struct Burst {
    pub origin: Vec3,
    pub particles: Vec<BurstParticle>,
    pub opacity: f32,
    life: f32,
}

/// Rate emitter that showers pool props for a bounded time.
#[derive(Debug, Clone, Default)]
struct RainEmitter {
    remaining: f32,
    acc: f32,
}

/// All live effects plus their triggers.
#[derive(Debug, Clone, Default)]
pub struct EffectField {
    pub birds: Vec<Bird>,
    pub halos: Vec<Halo>,
    pub burst: Option<Burst>,
    rain: RainEmitter,
}

impl EffectField {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flock crossing the road high over the spawn corridor ahead.
    pub fn trigger_bird_flyover(&mut self, follower_z: f32, rng: &mut Pcg32) {
        let z0 = follower_z - 34.0;
        for _ in 0..BIRD_FLOCK_SIZE {
            let from_left = rng.random_bool(0.5);
            let x = if from_left { -BIRD_SIDE_X } else { BIRD_SIDE_X };
            let vx = if from_left { 1.0 } else { -1.0 } * rng.random_range(5.2..=10.0);
            let vz = -rng.random_range(1.5..=4.0);
            self.birds.push(Bird {
                position: Vec3::new(x, rng.random_range(11.0..=18.0), z0 - rng.random_range(0.0..=26.0)),
                vx,
                vz,
                phase: rng.random_range(0.0..=std::f32::consts::TAU),
                scale: rng.random_range(1.1..=1.7),
                heading: vx.atan2(vz),
                life: rng.random_range(2.6..=3.8),
            });
        }
    }

    /// Halo over one actor; position snaps to the actor every tick.
    pub fn spawn_halo(&mut self, target: ActorRole) {
        self.halos.push(Halo {
            target,
            position: Vec3::new(0.0, HALO_HOVER, 0.0),
            alpha: 0.0,
            scale: 0.6,
            spin: 0.0,
            life: HALO_TTL,
        });
    }

    /// Radial blast behind the follower. Re-triggering replaces a live burst.
    pub fn trigger_run_blast(&mut self, follower_z: f32, rng: &mut Pcg32) {
        let mut particles = Vec::with_capacity(BLAST_PARTICLES);
        for _ in 0..BLAST_PARTICLES {
            let angle = rng.random_range(0.0..=std::f32::consts::TAU);
            let radius = rng.random_range(0.15..=0.70);
            let speed = rng.random_range(2.6..=8.0);
            particles.push(BurstParticle {
                offset: Vec3::new(
                    angle.cos() * radius,
                    rng.random_range(-0.035..=0.315),
                    angle.sin() * radius,
                ),
                velocity: Vec3::new(
                    angle.cos() * speed,
                    rng.random_range(0.2..=1.3) * speed,
                    angle.sin() * speed,
                ),
            });
        }
        self.burst = Some(Burst {
            origin: Vec3::new(0.0, 2.0, follower_z - 6.0),
            particles,
            opacity: 0.9,
            life: BLAST_TTL,
        });
    }

    pub fn start_victory_rain(&mut self, seconds: f32) {
        self.rain.remaining = seconds.max(0.2);
        self.rain.acc = 0.0;
    }

    pub fn rain_active(&self) -> bool {
        self.rain.remaining > 0.0
    }

    /// Advance every live effect and expire the ones whose life ran out.
    pub fn update(&mut self, dt: f32, actors: &ActorPair, meat: &mut MeatField, rng: &mut Pcg32) {
        self.update_birds(dt);
        self.update_halos(dt, actors);
        self.update_burst(dt);
        self.update_rain(dt, actors.leader_z(), meat, rng);
    }

    fn update_birds(&mut self, dt: f32) {
        for bird in &mut self.birds {
            bird.life -= dt;
            bird.phase += dt * BIRD_FLAP_RATE;
            bird.position.x += bird.vx * dt;
            bird.position.z += bird.vz * dt;
            // Slight bob
            bird.position.y += (bird.phase * 0.7).sin() * dt * 0.6;
        }
        self.birds.retain(|b| b.life > 0.0);
    }

    fn update_halos(&mut self, dt: f32, actors: &ActorPair) {
        for halo in &mut self.halos {
            halo.life -= dt;
            if halo.life <= 0.0 {
                continue;
            }
            let t = 1.0 - halo.life / HALO_TTL;
            let fade_in = (t / HALO_FADE_IN).min(1.0);
            let fade_out = ((1.0 - t) / HALO_FADE_OUT).min(1.0);
            halo.alpha = HALO_PEAK_ALPHA * fade_in * fade_out;
            halo.scale = 0.6 + t * 0.8;
            halo.spin += dt * 1.8;

            let anchor = match halo.target {
                ActorRole::Leader => &actors.leader,
                ActorRole::Follower => &actors.follower,
            };
            halo.position = Vec3::new(
                anchor.position.x,
                HALO_HOVER + 0.08 * (t * std::f32::consts::TAU).sin(),
                anchor.position.z,
            );
        }
        self.halos.retain(|h| h.life > 0.0);
    }

    fn update_burst(&mut self, dt: f32) {
        if let Some(burst) = &mut self.burst {
            burst.life -= dt;
            if burst.life <= 0.0 {
                self.burst = None;
                return;
            }
            for p in &mut burst.particles {
                p.offset += p.velocity * dt;
                p.velocity.x *= 0.985;
                p.velocity.y *= 0.975;
                p.velocity.z *= 0.985;
            }
            let t = 1.0 - burst.life / BLAST_TTL;
            burst.opacity = 0.9 * (1.0 - t);
        }
    }

    fn update_rain(&mut self, dt: f32, leader_z: f32, meat: &mut MeatField, rng: &mut Pcg32) {
        if self.rain.remaining <= 0.0 {
            return;
        }
        self.rain.remaining -= dt;
        if self.rain.remaining <= 0.0 {
            self.rain.remaining = 0.0;
            return;
        }
        self.rain.acc += dt * RAIN_RATE;
        while self.rain.acc >= 1.0 {
            self.rain.acc -= 1.0;
            let spawn = PropSpawn::rain(leader_z, rng);
            meat.spawn(spawn, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(11)
    }

    #[test]
    fn birds_expire_after_their_ttl() {
        let mut fx = EffectField::new();
        let actors = ActorPair::new();
        let mut meat = MeatField::new(8);
        let mut r = rng();

        fx.trigger_bird_flyover(0.0, &mut r);
        assert_eq!(fx.birds.len(), 9);

        for _ in 0..40 {
            fx.update(0.1, &actors, &mut meat, &mut r);
        }
        assert!(fx.birds.is_empty());
    }

    #[test]
    fn halo_envelope_fades_in_and_out_without_pops() {
        let mut fx = EffectField::new();
        let actors = ActorPair::new();
        let mut meat = MeatField::new(8);
        let mut r = rng();

        fx.spawn_halo(ActorRole::Leader);

        fx.update(0.01, &actors, &mut meat, &mut r);
        let early = fx.halos[0].alpha;
        assert!(early < 0.1, "no hard pop at birth: {early}");

        for _ in 0..50 {
            fx.update(0.01, &actors, &mut meat, &mut r);
        }
        let mid = fx.halos[0].alpha;
        assert!(mid > 0.5, "fully faded in at mid-life: {mid}");
        // Tracks the leader's lane.
        assert_eq!(fx.halos[0].position.x, actors.leader.position.x);

        for _ in 0..70 {
            fx.update(0.01, &actors, &mut meat, &mut r);
        }
        assert!(fx.halos.is_empty());
    }

    #[test]
    fn retriggered_blast_replaces_the_live_one() {
        let mut fx = EffectField::new();
        let actors = ActorPair::new();
        let mut meat = MeatField::new(8);
        let mut r = rng();

        fx.trigger_run_blast(0.0, &mut r);
        fx.update(0.5, &actors, &mut meat, &mut r);
        let faded = fx.burst.as_ref().unwrap().opacity;
        assert!(faded < 0.9);

        fx.trigger_run_blast(-10.0, &mut r);
        let burst = fx.burst.as_ref().unwrap();
        assert_eq!(burst.opacity, 0.9);
        assert_eq!(burst.origin.z, -16.0);

        // Runs out on its own.
        fx.update(1.0, &actors, &mut meat, &mut r);
        assert!(fx.burst.is_none());
    }

    #[test]
    fn victory_rain_emits_at_a_stable_rate_then_stops() {
        let mut fx = EffectField::new();
        let actors = ActorPair::new();
        let mut meat = MeatField::new(4096);
        let mut r = rng();

        fx.start_victory_rain(1.0);
        assert!(fx.rain_active());
        let mut spawned_max = 0;
        for _ in 0..300 {
            fx.update(0.01, &actors, &mut meat, &mut r);
            spawned_max = spawned_max.max(meat.active_count());
        }
        assert!(!fx.rain_active());
        // ~46 props over the single live second, allowing accumulator drift
        // and early ttl expiry.
        assert!(
            (40..=50).contains(&spawned_max),
            "spawned {spawned_max} props"
        );
    }
}
