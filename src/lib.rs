//! Verse Trail - an endless-road greeting scene
//!
//! Core modules:
//! - `sim`: Deterministic scene simulation (motion, road recycling, props, FX, scoring)
//! - `script`: Scripted verse feed driving the walk/run phases
//! - `assets`: Probe/load policy with placeholder fallbacks and clip selection
//! - `audio`: Two-track audio director with autoplay-block recovery
//! - `ui`: HUD director over a narrow DOM-side interface
//! - `timers`: Purpose-keyed cancellable deferred tasks
//! - `presenter`: Scene-frame bridge to the host renderer

pub mod assets;
pub mod audio;
pub mod presenter;
pub mod script;
pub mod settings;
pub mod sim;
pub mod timers;
pub mod ui;

pub use settings::SceneSettings;

/// Scene configuration constants
pub mod consts {
    /// Maximum simulated time per frame; larger raw deltas (tab was
    /// backgrounded, long GC pause) are clamped to this.
    pub const FRAME_CAP: f32 = 1.0 / 30.0;

    /// Forward speeds (units/s); forward is -z.
    pub const WALK_SPEED: f32 = 0.55;
    pub const RUN_SPEED: f32 = 4.7;
    /// Longitudinal gap between the follower and the leader ahead of it.
    pub const FOLLOWER_GAP: f32 = 3.6;
    /// Slight lane split so the leader stays visible (not blocked behind the follower).
    pub const LEADER_LANE_X: f32 = -1.4;
    pub const FOLLOWER_LANE_X: f32 = 1.4;
    /// Character models face +z; turn them to face into the scene.
    pub const ACTOR_YAW: f32 = std::f32::consts::PI;
    /// Height of the camera look target above the road.
    pub const CAMERA_TARGET_HEIGHT: f32 = 1.6;

    /// Road ribbon
    pub const ROAD_WIDTH: f32 = 7.0;
    pub const ROAD_SEG_LENGTH: f32 = 14.0;
    pub const ROAD_SEG_COUNT: usize = 10;
    /// How far a segment may trail the reference before it is recycled ahead.
    pub const ROAD_BEHIND_MARGIN: f32 = ROAD_SEG_LENGTH * 1.2;

    /// Falling meat props
    pub const MEAT_POOL_CAPACITY: usize = 140;
    pub const MEAT_SPAWN_PER_SEC: f32 = 14.0;
    pub const MEAT_SPAWN_HALF_WIDTH: f32 = 6.5;
    pub const MEAT_SPAWN_HEIGHT: f32 = 14.0;
    pub const MEAT_SPAWN_HEIGHT_JITTER: f32 = 10.0;
    pub const MEAT_SPAWN_AHEAD_MIN: f32 = 8.0;
    pub const MEAT_SPAWN_AHEAD_MAX: f32 = 34.0;
    pub const MEAT_FALL_SPEED_MIN: f32 = 6.5;
    pub const MEAT_FALL_SPEED_MAX: f32 = 12.0;
    pub const MEAT_SPIN_SPEED_MAX: f32 = 2.2;
    /// Normalized display height of the prop model.
    pub const MEAT_TARGET_HEIGHT: f32 = 0.55;
    /// Culling bounds (below ground, above sky, behind camera, far from actors).
    pub const MEAT_KILL_Y: f32 = -2.0;
    pub const MEAT_CEILING_Y: f32 = 34.0;
    pub const MEAT_BEHIND_CAMERA: f32 = 18.0;
    pub const MEAT_FAR_CULL: f32 = 220.0;
    /// Rare golden props: rolled at spawn time, score multiplier on collect.
    pub const GOLDEN_CHANCE: f64 = 0.06;
    pub const GOLDEN_MULTIPLIER: u32 = 3;

    /// Combo / scoring
    pub const COMBO_STEP: u32 = 3;
    pub const COMBO_MAX_MULTIPLIER: u32 = 5;
    pub const COMBO_WINDOW_SECS: f32 = 4.0;
    pub const MEAT_VALUE_MIN: u32 = 1;
    pub const MEAT_VALUE_MAX: u32 = 30;
    /// Running total that triggers the one-time celebration.
    pub const SCORE_TARGET: u32 = 200;

    /// Verse crawl timing
    pub const INTRO_DWELL_SECS: f32 = 1.6;
    pub const LINE_DWELL_SECS: f32 = 5.2;

    /// Audio volumes
    pub const GREETING_VOLUME: f32 = 0.9;
    pub const MUSIC_VOLUME: f32 = 0.35;

    /// Animation time scales
    pub const WALK_TIME_SCALE: f32 = 1.0;
    pub const RUN_TIME_SCALE: f32 = 1.05;
    /// Used when walk and run resolved to the same clip.
    pub const RUN_TIME_SCALE_SAME_CLIP: f32 = 1.15;
    /// Crossfade length between walk and run clips.
    pub const CLIP_FADE_SECS: f32 = 0.35;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
