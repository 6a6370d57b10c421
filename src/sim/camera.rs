//! Follow camera rig
//!
//! The rig is described by five parameters (behind / up / side / look-ahead /
//! fov) blended every tick toward the preset matching the current motion mode,
//! so walk→run widens and lifts the shot smoothly instead of cutting.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::motion::{ActorPair, MotionMode};
use crate::consts::CAMERA_TARGET_HEIGHT;
use crate::lerp;

/// Fraction of the parameter gap closed per tick.
const PARAM_BLEND: f32 = 0.06;
/// Fraction of the eye-position gap closed per tick.
const EYE_BLEND: f32 = 0.08;

/// A camera framing for one motion mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub behind: f32,
    pub up: f32,
    pub side: f32,
    pub look_ahead: f32,
    pub fov: f32,
}

impl CameraPreset {
    /// Close, low framing for the walk.
    pub const WALK: Self = Self {
        behind: 15.5,
        up: 5.2,
        side: 1.1,
        look_ahead: 2.6,
        fov: 52.0,
    };

    /// Pulled back and lifted for the run, with a wider field of view.
    pub const RUN: Self = Self {
        behind: 28.0,
        up: 9.0,
        side: 1.8,
        look_ahead: 9.0,
        fov: 68.0,
    };

    pub fn for_mode(mode: MotionMode) -> Self {
        match mode {
            MotionMode::Walk => Self::WALK,
            MotionMode::Run => Self::RUN,
        }
    }
}

/// Smoothly interpolated rig state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRig {
    behind: f32,
    up: f32,
    side: f32,
    look_ahead: f32,
    pub fov: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraRig {
    pub fn new() -> Self {
        let p = CameraPreset::WALK;
        Self {
            behind: p.behind,
            up: p.up,
            side: p.side,
            look_ahead: p.look_ahead,
            fov: p.fov,
            eye: Vec3::new(0.0, p.up, p.behind),
            target: Vec3::new(0.0, CAMERA_TARGET_HEIGHT, -p.look_ahead),
        }
    }

    /// Re-target toward the active preset and follow the (post-motion) actors.
    pub fn update(&mut self, mode: MotionMode, actors: &ActorPair) {
        let preset = CameraPreset::for_mode(mode);
        self.behind = lerp(self.behind, preset.behind, PARAM_BLEND);
        self.up = lerp(self.up, preset.up, PARAM_BLEND);
        self.side = lerp(self.side, preset.side, PARAM_BLEND);
        self.look_ahead = lerp(self.look_ahead, preset.look_ahead, PARAM_BLEND);
        self.fov = lerp(self.fov, preset.fov, PARAM_BLEND);

        let (mid_x, mid_z) = actors.midpoint();
        let desired = Vec3::new(
            mid_x + self.side,
            self.up,
            actors.reference_z() + self.behind,
        );
        self.eye = self.eye.lerp(desired, EYE_BLEND);
        self.target = Vec3::new(mid_x, CAMERA_TARGET_HEIGHT, mid_z - self.look_ahead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_converges_on_run_preset() {
        let actors = ActorPair::new();
        let mut rig = CameraRig::new();
        for _ in 0..600 {
            rig.update(MotionMode::Run, &actors);
        }
        let run = CameraPreset::RUN;
        assert!((rig.fov - run.fov).abs() < 0.1);
        assert!((rig.behind - run.behind).abs() < 0.1);
        assert!((rig.eye.y - run.up).abs() < 0.1);
    }

    #[test]
    fn blend_is_gradual() {
        let actors = ActorPair::new();
        let mut rig = CameraRig::new();
        rig.update(MotionMode::Run, &actors);
        // One tick in: strictly between the two presets.
        assert!(rig.fov > CameraPreset::WALK.fov);
        assert!(rig.fov < CameraPreset::RUN.fov);
    }

    #[test]
    fn eye_trails_behind_the_follower() {
        let mut actors = ActorPair::new();
        let mut rig = CameraRig::new();
        for _ in 0..400 {
            actors.integrate(MotionMode::Walk, 1.0 / 60.0);
            rig.update(MotionMode::Walk, &actors);
        }
        assert!(rig.eye.z > actors.reference_z());
        // Aim point sits ahead of the pair.
        let (_, mid_z) = actors.midpoint();
        assert!(rig.target.z < mid_z);
    }
}
