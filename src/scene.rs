use rapier3d_f64::prelude::*;
use tracing::info;

use crate::backend::{BodyHandle, PhysicsBackend};
use crate::config::{ControlTuning, GroundConfig, SceneConfig};
use crate::control;
use crate::error::RigError;
use crate::ground::{GroundLoad, GroundState, TextureSource};
use crate::input::InputState;
use crate::rapier::RapierBackend;
use crate::rig::{self, VehicleRig};

/// Camera that hovers at a fixed offset from the chassis. Cosmetic only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFollow {
    pub offset: Vector<Real>,
    pub position: Point<Real>,
    pub look_at: Point<Real>,
}

impl CameraFollow {
    pub fn new(offset: Vector<Real>) -> Self {
        CameraFollow {
            offset,
            position: Point::from(offset),
            look_at: Point::origin(),
        }
    }

    pub fn follow(&mut self, target: &Isometry<Real>) {
        self.look_at = Point::from(target.translation.vector);
        self.position = self.look_at + self.offset;
    }
}

/// One vehicle in one world, driven by key events and ticked by the host.
pub struct Scene<B: PhysicsBackend> {
    backend: B,
    rig: VehicleRig,
    input: InputState,
    tuning: ControlTuning,
    ground: Option<GroundLoad>,
    camera: CameraFollow,
    ticks: u64,
}

impl Scene<RapierBackend> {
    pub fn from_config(config: &SceneConfig) -> Result<Self, RigError> {
        Scene::new(RapierBackend::new(config.dt, config.gravity()), config)
    }
}

impl<B: PhysicsBackend> Scene<B> {
    /// Builds the configured rig into `backend`. On failure the backend is
    /// dropped along with whatever was registered so far.
    pub fn new(mut backend: B, config: &SceneConfig) -> Result<Self, RigError> {
        config.tuning.validate()?;
        let rig = rig::build(&mut backend, &config.rig(), config.debug)?;

        let mut camera = CameraFollow::new(vector![0.0, 10.0, 0.0]);
        if let Some(pose) = backend.body_pose(rig.chassis) {
            camera.follow(&pose);
        }

        Ok(Scene {
            backend,
            rig,
            input: InputState::default(),
            tuning: config.tuning.clone(),
            ground: None,
            camera,
            ticks: 0,
        })
    }

    /// Starts loading the ground in the background. The scene keeps ticking
    /// without it.
    pub fn load_ground<S: TextureSource>(&mut self, source: S, config: &GroundConfig) {
        self.ground = Some(GroundLoad::spawn(source, config));
    }

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, code: &str) -> bool {
        self.input.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.input.key_up(code)
    }

    pub fn tick(&mut self) -> Result<(), RigError> {
        control::run_tick(&mut self.backend, &self.rig, &self.input, &self.tuning)?;
        self.backend.step();

        if let Some(ground) = &mut self.ground {
            let was_pending = ground.state() == GroundState::Pending;
            if let GroundState::Ready(handle) = ground.poll(&mut self.backend) {
                if was_pending {
                    info!(tick = self.ticks, %handle, "ground arrived");
                }
            }
        }

        if let Some(pose) = self.backend.body_pose(self.rig.chassis) {
            self.camera.follow(&pose);
        }
        self.ticks += 1;
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn rig(&self) -> &VehicleRig {
        &self.rig
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn camera(&self) -> &CameraFollow {
        &self.camera
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ground(&self) -> Option<BodyHandle> {
        match self.ground.as_ref()?.state() {
            GroundState::Ready(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn ground_state(&self) -> Option<GroundState> {
        self.ground.as_ref().map(GroundLoad::state)
    }

    pub fn chassis_pose(&self) -> Option<Isometry<Real>> {
        self.backend.body_pose(self.rig.chassis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    #[test]
    fn camera_hovers_over_chassis() {
        let mut camera = CameraFollow::new(vector![0.0, 10.0, 0.0]);
        camera.follow(&Isometry::translation(3.0, 1.0, -2.0));
        assert_eq!(camera.look_at, point![3.0, 1.0, -2.0]);
        assert_eq!(camera.position, point![3.0, 11.0, -2.0]);
    }

    #[test]
    fn bad_geometry_aborts_scene() {
        let mut config = SceneConfig::for_variant(Variant::Simple);
        config.simple.wheel.radius = -0.5;
        let err = Scene::from_config(&config).err().unwrap();
        assert!(matches!(err, RigError::Construction { .. }));
    }

    #[test]
    fn bad_tuning_fails_at_construction_not_at_tick() {
        let mut config = SceneConfig::for_variant(Variant::Steered);
        config.tuning.steered_steer_dt = 0.0;
        let err = Scene::from_config(&config).err().unwrap();
        assert_eq!(err, RigError::construction("tuning field steered_steer_dt", "must be finite and > 0"));
    }

    #[test]
    fn keys_reach_input_state() {
        let mut scene = Scene::from_config(&SceneConfig::default()).unwrap();
        assert!(scene.key_down("KeyW"));
        assert!(!scene.key_down("KeyZ"));
        assert!(scene.input().forward);
        scene.tick().unwrap();
        assert!(scene.key_up("KeyW"));
        assert_eq!(*scene.input(), InputState::default());
        assert_eq!(scene.ticks(), 1);
    }
}
