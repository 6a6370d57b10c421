//! Deterministic scene simulation
//!
//! All scene logic lives here. This module must stay pure and deterministic:
//! - Clamped timestep only, driven by the caller's frame clock
//! - Seeded RNG only, owned by the world state
//! - No rendering, DOM, or audio dependencies
//!
//! The wasm entry point and the headless demo both drive it the same way:
//! `step(&mut world, &input, dt)` once per frame.

pub mod camera;
pub mod combo;
pub mod effects;
pub mod meat;
pub mod motion;
pub mod pool;
pub mod road;
pub mod state;
pub mod tick;

pub use camera::{CameraPreset, CameraRig};
pub use combo::{CollectOutcome, ComboMeter, ScoreState};
pub use effects::EffectField;
pub use meat::{MeatField, MeatProp, PropId, PropSpawn};
pub use motion::{Actor, ActorPair, ActorRole, AnimChannel, ClipRole, MotionMode};
pub use pool::{Pool, PoolSlot};
pub use road::{RoadRibbon, RoadSegment};
pub use state::{WorldEvent, WorldState};
pub use tick::{step, FrameClock, FrameInput, TapInput};
