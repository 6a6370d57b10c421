//! Scene-frame bridge to the host renderer
//!
//! Rendering (scene graph, model decoding, drawing) lives outside this crate.
//! Each frame the simulation is condensed into a [`SceneFrame`] — a plain
//! serializable description of everything visible — and handed to a
//! [`ScenePresenter`]. The wasm entry point forwards frames to the embedding
//! page; tests and the headless demo use [`NullPresenter`].

use glam::Vec3;
use serde::Serialize;

use crate::sim::motion::{ActorRole, AnimChannel};
use crate::sim::WorldState;

#[derive(Debug, Clone, Serialize)]
pub struct ActorView {
    pub role: ActorRole,
    pub position: Vec3,
    pub yaw: f32,
    pub anim: AnimChannel,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropView {
    /// Stable pick id; the host tags the prop's render node with it.
    pub id: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub golden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirdView {
    pub position: Vec3,
    pub heading: f32,
    pub flap: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HaloView {
    pub position: Vec3,
    pub alpha: f32,
    pub scale: f32,
    pub spin: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BurstView {
    pub origin: Vec3,
    pub opacity: f32,
    pub particles: Vec<Vec3>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov: f32,
}

/// One frame's worth of renderable state.
#[derive(Debug, Clone, Serialize)]
pub struct SceneFrame {
    pub camera: CameraView,
    pub actors: Vec<ActorView>,
    /// Segment centers; width/length are static config.
    pub road: Vec<f32>,
    /// Active props only.
    pub props: Vec<PropView>,
    pub birds: Vec<BirdView>,
    pub halos: Vec<HaloView>,
    pub burst: Option<BurstView>,
}

impl SceneFrame {
    pub fn capture(world: &WorldState) -> Self {
        let actors = [&world.actors.leader, &world.actors.follower]
            .into_iter()
            .map(|a| ActorView {
                role: a.role,
                position: a.position,
                yaw: a.yaw,
                anim: a.anim.clone(),
            })
            .collect();

        Self {
            camera: CameraView {
                eye: world.camera.eye,
                target: world.camera.target,
                fov: world.camera.fov,
            },
            actors,
            road: world.road.segments().iter().map(|s| s.z).collect(),
            props: world
                .meat
                .iter()
                .filter(|p| p.active)
                .map(|p| PropView {
                    id: p.id.0,
                    position: p.position,
                    rotation: p.rotation,
                    golden: p.golden,
                })
                .collect(),
            birds: world
                .fx
                .birds
                .iter()
                .map(|b| BirdView {
                    position: b.position,
                    heading: b.heading,
                    flap: b.flap_angle(),
                    scale: b.scale,
                })
                .collect(),
            halos: world
                .fx
                .halos
                .iter()
                .map(|h| HaloView {
                    position: h.position,
                    alpha: h.alpha,
                    scale: h.scale,
                    spin: h.spin,
                })
                .collect(),
            burst: world.fx.burst.as_ref().map(|b| BurstView {
                origin: b.origin,
                opacity: b.opacity,
                particles: b.particles.iter().map(|p| p.offset).collect(),
            }),
        }
    }
}

/// Where frames go. Implementations must not block.
pub trait ScenePresenter {
    fn present(&mut self, frame: &SceneFrame);
    fn resize(&mut self, width: u32, height: u32);
}

/// Swallows frames; used headless and in tests.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl ScenePresenter for NullPresenter {
    fn present(&mut self, _frame: &SceneFrame) {}
    fn resize(&mut self, _width: u32, _height: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneSettings;
    use crate::sim::{MotionMode, PropSpawn};

    #[test]
    fn capture_reflects_only_active_props() {
        let mut world = WorldState::new(5, SceneSettings::default());
        let mut events = Vec::new();
        world.set_mode(MotionMode::Run, &mut events);

        let spawn = PropSpawn::falling(0.0, &mut world.rng);
        let first = world.meat.spawn(spawn, &mut world.rng);
        let spawn = PropSpawn::falling(0.0, &mut world.rng);
        world.meat.spawn(spawn, &mut world.rng);
        world.tap(None, &mut events);

        let frame = SceneFrame::capture(&world);
        assert_eq!(frame.actors.len(), 2);
        assert_eq!(frame.road.len(), crate::consts::ROAD_SEG_COUNT);
        // The tap fell back to the first active prop; the frame carries the
        // survivor only.
        assert_eq!(frame.props.len(), 1);
        assert_ne!(frame.props[0].id, first.0);
        assert_eq!(frame.birds.len(), world.fx.birds.len());
        assert!(frame.burst.is_some());
    }

    #[test]
    fn frames_serialize_for_the_bridge() {
        let world = WorldState::new(5, SceneSettings::default());
        let frame = SceneFrame::capture(&world);
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"camera\""));
        assert!(json.contains("\"road\""));
    }
}
