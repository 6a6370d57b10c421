//! Actor pair and forward motion
//!
//! Two actors share the road for the whole session: the leader walks a fixed
//! gap ahead of the follower on a split lane. Only the follower is integrated;
//! the leader's longitudinal position is derived, which keeps the gap exact
//! no matter how coarse the timestep gets.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::ClipSet;
use crate::consts::*;

/// Current locomotion mode of the whole scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    Walk,
    Run,
}

impl MotionMode {
    pub fn speed(self) -> f32 {
        match self {
            MotionMode::Walk => WALK_SPEED,
            MotionMode::Run => RUN_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    Leader,
    Follower,
}

/// Which animation clip a channel is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipRole {
    Walk,
    Run,
}

/// Crossfade between the previous clip and the active one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossFade {
    pub from: ClipRole,
    pub remaining: f32,
    pub duration: f32,
}

/// Animation playback state the presenter mirrors onto its mixer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimChannel {
    pub active: ClipRole,
    pub time_scale: f32,
    /// Clip-local clock, already scaled.
    pub clock: f32,
    pub fade: Option<CrossFade>,
}

impl Default for AnimChannel {
    fn default() -> Self {
        Self {
            active: ClipRole::Walk,
            time_scale: WALK_TIME_SCALE,
            clock: 0.0,
            fade: None,
        }
    }
}

impl AnimChannel {
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt * self.time_scale;
        if let Some(fade) = &mut self.fade {
            fade.remaining -= dt;
            if fade.remaining <= 0.0 {
                self.fade = None;
            }
        }
    }

    /// Weight of the active clip, 0 at fade start rising to 1.
    pub fn mix(&self) -> f32 {
        match &self.fade {
            Some(fade) if fade.duration > 0.0 => 1.0 - (fade.remaining / fade.duration).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// Switch clips with a crossfade, restarting the incoming clip.
    pub fn crossfade_to(&mut self, role: ClipRole, time_scale: f32) {
        if self.active == role {
            self.time_scale = time_scale;
            return;
        }
        self.fade = Some(CrossFade {
            from: self.active,
            remaining: CLIP_FADE_SECS,
            duration: CLIP_FADE_SECS,
        });
        self.active = role;
        self.time_scale = time_scale;
        self.clock = 0.0;
    }

    /// Keep the current clip playing and only change its speed. Used when
    /// walk and run resolved to the same clip, so a hard reset would pop.
    pub fn retime(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }
}

/// One on-screen character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub role: ActorRole,
    pub position: Vec3,
    pub yaw: f32,
    pub anim: AnimChannel,
    pub clips: ClipSet,
}

impl Actor {
    fn new(role: ActorRole, lane_x: f32, z: f32) -> Self {
        Self {
            role,
            position: Vec3::new(lane_x, 0.0, z),
            yaw: ACTOR_YAW,
            anim: AnimChannel::default(),
            clips: ClipSet::default(),
        }
    }

    /// Apply a locomotion mode to the animation channel.
    pub fn apply_mode(&mut self, mode: MotionMode) {
        match mode {
            MotionMode::Walk => self.anim.crossfade_to(ClipRole::Walk, WALK_TIME_SCALE),
            MotionMode::Run => {
                if self.clips.shared_clip() {
                    self.anim.retime(RUN_TIME_SCALE_SAME_CLIP);
                } else {
                    self.anim.crossfade_to(ClipRole::Run, RUN_TIME_SCALE);
                }
            }
        }
    }
}

/// The leader/follower pair plus the motion integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorPair {
    pub leader: Actor,
    pub follower: Actor,
}

impl Default for ActorPair {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorPair {
    /// Initial line-up: leader a gap ahead of the follower at the origin.
    pub fn new() -> Self {
        Self {
            leader: Actor::new(ActorRole::Leader, LEADER_LANE_X, -FOLLOWER_GAP),
            follower: Actor::new(ActorRole::Follower, FOLLOWER_LANE_X, 0.0),
        }
    }

    /// Advance both actors' animation channels.
    pub fn advance_animation(&mut self, dt: f32) {
        self.leader.anim.advance(dt);
        self.follower.anim.advance(dt);
    }

    /// Move forward (-z) at the mode's speed. The leader is re-derived from
    /// the follower afterwards, so readers in the same tick always see the
    /// post-motion pair with the gap intact.
    pub fn integrate(&mut self, mode: MotionMode, dt: f32) {
        self.follower.position.z -= mode.speed() * dt;
        self.leader.position.z = self.follower.position.z - FOLLOWER_GAP;
    }

    /// Longitudinal reference everything else (camera, road, spawns) keys on.
    pub fn reference_z(&self) -> f32 {
        self.follower.position.z
    }

    pub fn leader_z(&self) -> f32 {
        self.leader.position.z
    }

    /// Midpoint between the actors (camera aim point).
    pub fn midpoint(&self) -> (f32, f32) {
        (
            (self.leader.position.x + self.follower.position.x) * 0.5,
            (self.leader.position.z + self.follower.position.z) * 0.5,
        )
    }
}
