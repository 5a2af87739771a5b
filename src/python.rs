use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::backend::PhysicsBackend;
use crate::config::{SceneConfig, Variant};
use crate::error::RigError;
use crate::rapier::RapierBackend;
use crate::scene::Scene;

fn rig_err(e: RigError) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

#[pyclass(unsendable)]
struct VehicleSimulation {
    scene: Scene<RapierBackend>,
}

#[pymethods]
impl VehicleSimulation {
    #[new]
    #[pyo3(signature = (variant = "steered", config_json = None))]
    fn new(variant: &str, config_json: Option<&str>) -> PyResult<Self> {
        let variant: Variant = variant.parse().map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        let mut config = match config_json {
            Some(json) => SceneConfig::from_json_str(json).map_err(|e| PyValueError::new_err(format!("{:#}", e)))?,
            None => SceneConfig::default(),
        };
        config.variant = variant;

        let scene = Scene::from_config(&config).map_err(rig_err)?;
        Ok(VehicleSimulation { scene })
    }

    fn key_down(&mut self, code: &str) -> bool {
        self.scene.key_down(code)
    }

    fn key_up(&mut self, code: &str) -> bool {
        self.scene.key_up(code)
    }

    /// Advances one tick and returns the chassis pose as
    /// `[x, y, z, qx, qy, qz, qw]`.
    fn step(&mut self) -> PyResult<Vec<f64>> {
        self.scene.tick().map_err(rig_err)?;

        let pose = self
            .scene
            .chassis_pose()
            .ok_or_else(|| PyRuntimeError::new_err("chassis vanished"))?;
        let t = pose.translation.vector;
        let q = pose.rotation.coords;
        Ok(vec![t.x, t.y, t.z, q.x, q.y, q.z, q.w])
    }

    /// Current target of every motorized constraint: velocity for velocity
    /// motors, angle for position motors.
    fn motor_targets(&self) -> Vec<f64> {
        let backend = self.scene.backend();
        self.scene
            .rig()
            .motors
            .all()
            .into_iter()
            .filter_map(|c| backend.motor_state(c))
            .map(|state| state.target_velocity().or(state.target_angle()).unwrap_or(0.0))
            .collect()
    }
}

#[pymodule]
fn joint_car(module: &Bound<'_, PyModule>) -> PyResult<()> {
    crate::logging::init_logging();
    module.add_class::<VehicleSimulation>()?;
    Ok(())
}
