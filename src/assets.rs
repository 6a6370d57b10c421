//! Asset probing, fallback, and animation-clip selection
//!
//! Every asset is optional. A model that is missing or fails to decode is
//! replaced by a built-in primitive placeholder; the scene never refuses to
//! start over an asset problem (the worst case is a colored box walking the
//! road). Clip selection is a keyword-preference search so models from
//! different sources resolve to sensible walk/run animations.

use serde::{Deserialize, Serialize};

use crate::sim::motion::ClipRole;

/// Keyword preference order when resolving the walk clip.
pub const WALK_CLIP_KEYWORDS: [&str; 4] = ["walk", "run", "idle", "move"];
/// Keyword preference order when resolving the run clip.
pub const RUN_CLIP_KEYWORDS: [&str; 5] = ["run", "sprint", "dash", "walk", "idle"];

/// Relative URLs of the optional assets.
#[derive(Debug, Clone)]
pub struct AssetUrls {
    pub leader_model: &'static str,
    pub follower_model: &'static str,
    pub meat_model: &'static str,
    pub greeting_primary: &'static str,
    pub greeting_fallback: &'static str,
    pub music: &'static str,
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self {
            leader_model: "assets/leader.glb",
            follower_model: "assets/follower.glb",
            meat_model: "assets/meat.glb",
            greeting_primary: "assets/greeting.wav",
            greeting_fallback: "assets/greet.wav",
            music: "assets/music.mp3",
        }
    }
}

/// What the model slot is used for; decides placeholder shape and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    LeaderActor,
    FollowerActor,
    MeatProp,
}

impl AssetKind {
    /// Height the loaded (or placeholder) model is normalized to.
    pub fn target_height(self) -> f32 {
        match self {
            AssetKind::LeaderActor => 2.2,
            AssetKind::FollowerActor => 2.0,
            AssetKind::MeatProp => crate::consts::MEAT_TARGET_HEIGHT,
        }
    }

    /// Placeholder tint (0xRRGGBB) when the real model is unavailable.
    pub fn placeholder_color(self) -> u32 {
        match self {
            AssetKind::LeaderActor => 0xa78bfa,
            AssetKind::FollowerActor => 0x6ee7ff,
            AssetKind::MeatProp => 0xd46a5a,
        }
    }
}

/// Why a model could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// HEAD probe failed; the file is not there.
    Missing,
    /// The file exists but fetching/decoding it failed.
    LoadFailed(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Missing => write!(f, "asset missing"),
            AssetError::LoadFailed(reason) => write!(f, "asset load failed: {reason}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// Where the renderable for a slot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSource {
    Loaded,
    Placeholder,
}

/// Outcome of loading one model slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedModel {
    pub kind: AssetKind,
    pub source: ModelSource,
    /// Clip names reported by the loader (empty for placeholders).
    pub clip_names: Vec<String>,
    pub clips: ClipSet,
}

/// Turn a loader result into a usable model, falling back to the placeholder.
/// Load failures are logged and otherwise indistinguishable from a missing
/// asset: the show goes on either way.
pub fn resolve_model(kind: AssetKind, loaded: Result<Vec<String>, AssetError>) -> ResolvedModel {
    match loaded {
        Ok(clip_names) => {
            let clips = ClipSet::resolve(&clip_names);
            ResolvedModel {
                kind,
                source: ModelSource::Loaded,
                clip_names,
                clips,
            }
        }
        Err(err) => {
            log::warn!("{kind:?}: {err}; using placeholder");
            ResolvedModel {
                kind,
                source: ModelSource::Placeholder,
                clip_names: Vec::new(),
                clips: ClipSet::default(),
            }
        }
    }
}

/// Pick a clip by keyword preference: first keyword that matches any clip name
/// (case-insensitive substring) wins; otherwise the first clip is used.
pub fn pick_clip<'a>(names: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    if names.is_empty() {
        return None;
    }
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    for kw in keywords {
        if let Some(i) = lowered.iter().position(|n| n.contains(kw)) {
            return Some(&names[i]);
        }
    }
    Some(&names[0])
}

/// The walk and run clips an actor resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSet {
    pub walk: Option<String>,
    pub run: Option<String>,
}

impl ClipSet {
    /// Resolve both roles against the available clip names.
    pub fn resolve(names: &[String]) -> Self {
        Self {
            walk: pick_clip(names, &WALK_CLIP_KEYWORDS).map(str::to_owned),
            run: pick_clip(names, &RUN_CLIP_KEYWORDS).map(str::to_owned),
        }
    }

    /// A set where both roles map to one clip (single-animation models).
    pub fn single(name: &str) -> Self {
        Self {
            walk: Some(name.to_owned()),
            run: Some(name.to_owned()),
        }
    }

    /// True when walk and run resolved to the same underlying clip, in which
    /// case mode changes retime the clip instead of crossfading.
    pub fn shared_clip(&self) -> bool {
        self.walk.is_some() && self.walk == self.run
    }

    pub fn name_for(&self, role: ClipRole) -> Option<&str> {
        match role {
            ClipRole::Walk => self.walk.as_deref(),
            ClipRole::Run => self.run.as_deref(),
        }
    }
}
