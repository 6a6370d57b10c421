//! Scene settings
//!
//! Session-local configuration resolved once at boot (host media queries,
//! embedder toggles). Nothing here is persisted: the scene leaves no state
//! behind across visits.

use crate::consts::{GREETING_VOLUME, MUSIC_VOLUME};

/// Feature toggles and tuning for one session.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    /// Honors the host's prefers-reduced-motion: gates the flyover, halos,
    /// blast, staged bursts, and victory rain, and skips the crawl restart.
    pub reduced_motion: bool,

    // === Visual effects ===
    pub fx_enabled: bool,
    pub birds_on_run_start: bool,
    pub halo_burst_on_run_start: bool,
    pub victory_meat_rain: bool,

    // === Minigame ===
    pub meat_enabled: bool,
    pub counter_enabled: bool,

    // === Audio ===
    pub audio_enabled: bool,
    /// One-shot greeting volume (0.0 - 1.0)
    pub greeting_volume: f32,
    /// Looping music bed volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            reduced_motion: false,

            fx_enabled: true,
            birds_on_run_start: true,
            halo_burst_on_run_start: true,
            victory_meat_rain: true,

            meat_enabled: true,
            counter_enabled: true,

            audio_enabled: true,
            greeting_volume: GREETING_VOLUME,
            music_volume: MUSIC_VOLUME,
        }
    }
}

impl SceneSettings {
    /// Effective run-entry bird flyover (respects reduced motion).
    pub fn birds_at_run_start(&self) -> bool {
        self.fx_enabled && self.birds_on_run_start && !self.reduced_motion
    }

    /// Effective run-entry halos + blast (respects reduced motion).
    pub fn halo_burst_at_run_start(&self) -> bool {
        self.fx_enabled && self.halo_burst_on_run_start && !self.reduced_motion
    }

    /// Effective victory rain (respects reduced motion).
    pub fn victory_rain(&self) -> bool {
        self.fx_enabled && self.victory_meat_rain && !self.reduced_motion
    }
}
