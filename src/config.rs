//! Scene configuration. Every field has a default, so a config file only
//! needs to name what it changes.

use std::{fs, path::Path};

use anyhow::Context;
use rapier3d_f64::prelude::{Real, Vector};
use serde::Deserialize;

use crate::backend::GroundDesc;
use crate::error::RigError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Four rotor-mounted wheels, steered by twisting the front yoke.
    Mecanum,
    /// Same running gear bolted rigid to the plate, rear wheels driven.
    Simple,
    /// Front-steered car with sprung rear axle.
    #[default]
    Steered,
}

impl std::str::FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mecanum" => Ok(Variant::Mecanum),
            "simple" => Ok(Variant::Simple),
            "steered" => Ok(Variant::Steered),
            _ => anyhow::bail!("unknown variant {:?} (expected mecanum, simple or steered)", s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BoxDims {
    pub width: Real,
    pub height: Real,
    pub depth: Real,
    pub mass: Real,
}

/// Cylinder laid along world X; `width` is its length along that axis.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CylinderDims {
    pub radius: Real,
    pub width: Real,
    pub mass: Real,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MecanumConfig {
    pub wheel_x: Real,
    pub wheel_z: Real,
    /// Distance of each yoke axle from its wheel line.
    pub axis_z: Real,
    pub ride_height: Real,
    pub plate_y: Real,
    pub plate: BoxDims,
    pub wheel: CylinderDims,
    pub rotor: CylinderDims,
    pub axle: CylinderDims,
    /// Pivot of the rotor/axle hinge, along the rotor's own axis.
    pub rotor_pivot: Real,
    /// Pivot of the rotor/axle hinge, along the axle.
    pub axle_pivot: Real,
    pub suspension_travel: Real,
    pub suspension_offset: Real,
    pub drive_velocity: Real,
    pub drive_max_impulse: Real,
    pub steer_max_impulse: Real,
}

impl Default for MecanumConfig {
    fn default() -> Self {
        MecanumConfig {
            wheel_x: 1.5,
            wheel_z: 2.0,
            axis_z: 0.2,
            ride_height: 1.0,
            plate_y: 1.3,
            plate: BoxDims { width: 1.8, height: 0.25, depth: 4.7, mass: 50.0 },
            wheel: CylinderDims { radius: 0.5, width: 0.35, mass: 20.0 },
            rotor: CylinderDims { radius: 0.35, width: 0.4, mass: 10.0 },
            axle: CylinderDims { radius: 0.06, width: 2.575, mass: 10.0 },
            rotor_pivot: 0.2,
            axle_pivot: 1.3,
            suspension_travel: 0.2,
            suspension_offset: 0.6,
            drive_velocity: -10.0,
            drive_max_impulse: 0.05,
            steer_max_impulse: 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimpleConfig {
    pub wheel_x: Real,
    pub wheel_z: Real,
    pub ride_height: Real,
    pub plate_y: Real,
    pub plate: BoxDims,
    pub wheel: CylinderDims,
    pub rotor: CylinderDims,
    pub axle: CylinderDims,
    pub rotor_pivot: Real,
    pub axle_pivot: Real,
    pub drive_velocity: Real,
    pub coast_max_impulse: Real,
}

impl Default for SimpleConfig {
    fn default() -> Self {
        SimpleConfig {
            wheel_x: 1.5,
            wheel_z: 2.0,
            ride_height: 1.0,
            plate_y: 1.3,
            plate: BoxDims { width: 1.8, height: 0.25, depth: 4.7, mass: 50.0 },
            wheel: CylinderDims { radius: 0.5, width: 0.35, mass: 20.0 },
            rotor: CylinderDims { radius: 0.35, width: 0.4, mass: 10.0 },
            axle: CylinderDims { radius: 0.06, width: 2.575, mass: 10.0 },
            rotor_pivot: 0.2,
            axle_pivot: 1.3,
            drive_velocity: -10.0,
            coast_max_impulse: 0.02,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SteeredConfig {
    pub track_width: Real,
    pub wheelbase: Real,
    pub ride_height: Real,
    /// Height of the chassis centre above the axles.
    pub chassis_clearance: Real,
    pub chassis: BoxDims,
    pub axle: CylinderDims,
    pub wheel: CylinderDims,
    /// Sideways distance of each rear spring from the centre line.
    pub spring_offset: Real,
    pub spring_travel: Real,
    pub spring_stiffness: Real,
    pub spring_damping: Real,
    pub steer_limit: Real,
    pub steer_max_impulse: Real,
    pub drive_idle_max_impulse: Real,
}

impl Default for SteeredConfig {
    fn default() -> Self {
        SteeredConfig {
            track_width: 2.6,
            wheelbase: 3.4,
            ride_height: 1.0,
            chassis_clearance: 0.5,
            chassis: BoxDims { width: 1.8, height: 0.4, depth: 4.2, mass: 40.0 },
            axle: CylinderDims { radius: 0.08, width: 2.2, mass: 10.0 },
            wheel: CylinderDims { radius: 0.5, width: 0.35, mass: 20.0 },
            spring_offset: 0.6,
            spring_travel: 0.2,
            spring_stiffness: 60.0,
            spring_damping: 4.0,
            steer_limit: 0.4,
            steer_max_impulse: 1000.0,
            drive_idle_max_impulse: 0.2,
        }
    }
}

/// Per-tick motor targets. Values are tuning, not structure.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlTuning {
    pub mecanum_steer_target: Real,
    pub mecanum_steer_dt: Real,
    pub steered_speed: Real,
    pub steered_drive_max_impulse: Real,
    pub steered_coast_max_impulse: Real,
    pub steered_steer_target: Real,
    pub steered_steer_dt: Real,
    pub boost_impulse: Real,
}

impl Default for ControlTuning {
    fn default() -> Self {
        ControlTuning {
            mecanum_steer_target: 0.3,
            mecanum_steer_dt: 0.5,
            steered_speed: 50.0,
            steered_drive_max_impulse: 5.0,
            steered_coast_max_impulse: 0.2,
            steered_steer_target: 0.4,
            steered_steer_dt: 0.1,
            boost_impulse: 20.0,
        }
    }
}

impl ControlTuning {
    /// Catches targets that would only fail once the first tick sends them.
    pub fn validate(&self) -> Result<(), RigError> {
        let mut check = Check::default();
        check.finite("mecanum_steer_target", self.mecanum_steer_target);
        check.positive("mecanum_steer_dt", self.mecanum_steer_dt);
        check.finite("steered_speed", self.steered_speed);
        check.non_negative("steered_drive_max_impulse", self.steered_drive_max_impulse);
        check.non_negative("steered_coast_max_impulse", self.steered_coast_max_impulse);
        check.finite("steered_steer_target", self.steered_steer_target);
        check.positive("steered_steer_dt", self.steered_steer_dt);
        check.finite("boost_impulse", self.boost_impulse);
        check.finish("tuning")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub width: Real,
    pub depth: Real,
    pub y: Real,
    pub friction: Real,
    pub texture: String,
    /// How often the texture tiles across the plane.
    pub texture_repeat: [u32; 2],
}

impl Default for GroundConfig {
    fn default() -> Self {
        GroundConfig {
            width: 200.0,
            depth: 200.0,
            y: 0.0,
            friction: 1.0,
            texture: "assets/grass.jpg".to_owned(),
            texture_repeat: [20, 20],
        }
    }
}

impl GroundConfig {
    pub fn desc(&self) -> GroundDesc {
        GroundDesc {
            width: self.width,
            depth: self.depth,
            y: self.y,
            friction: self.friction,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: Variant,
    /// Logs every registered body and constraint.
    pub debug: bool,
    pub dt: Real,
    pub gravity: [Real; 3],
    pub mecanum: MecanumConfig,
    pub simple: SimpleConfig,
    pub steered: SteeredConfig,
    pub tuning: ControlTuning,
    pub ground: GroundConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            variant: Variant::default(),
            debug: false,
            dt: 1.0 / 60.0,
            gravity: [0.0, -9.81, 0.0],
            mecanum: MecanumConfig::default(),
            simple: SimpleConfig::default(),
            steered: SteeredConfig::default(),
            tuning: ControlTuning::default(),
            ground: GroundConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn for_variant(variant: Variant) -> Self {
        SceneConfig { variant, ..SceneConfig::default() }
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid scene config")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("unable to read scene config {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn gravity(&self) -> Vector<Real> {
        Vector::new(self.gravity[0], self.gravity[1], self.gravity[2])
    }

    pub fn rig(&self) -> RigConfig {
        match self.variant {
            Variant::Mecanum => RigConfig::Mecanum(self.mecanum.clone()),
            Variant::Simple => RigConfig::Simple(self.simple.clone()),
            Variant::Steered => RigConfig::Steered(self.steered.clone()),
        }
    }
}

/// Geometry for one rig variant.
#[derive(Clone, Debug, PartialEq)]
pub enum RigConfig {
    Mecanum(MecanumConfig),
    Simple(SimpleConfig),
    Steered(SteeredConfig),
}

impl RigConfig {
    pub fn variant(&self) -> Variant {
        match self {
            RigConfig::Mecanum(_) => Variant::Mecanum,
            RigConfig::Simple(_) => Variant::Simple,
            RigConfig::Steered(_) => Variant::Steered,
        }
    }

    /// Rejects geometry the engine would choke on before anything is built.
    pub fn validate(&self) -> Result<(), RigError> {
        let mut check = Check::default();
        match self {
            RigConfig::Mecanum(c) => {
                check.finite("wheel_x", c.wheel_x);
                check.finite("wheel_z", c.wheel_z);
                check.finite("axis_z", c.axis_z);
                check.finite("ride_height", c.ride_height);
                check.finite("plate_y", c.plate_y);
                check.finite("rotor_pivot", c.rotor_pivot);
                check.finite("axle_pivot", c.axle_pivot);
                check.finite("suspension_offset", c.suspension_offset);
                check.finite("drive_velocity", c.drive_velocity);
                check.non_negative("suspension_travel", c.suspension_travel);
                check.non_negative("drive_max_impulse", c.drive_max_impulse);
                check.non_negative("steer_max_impulse", c.steer_max_impulse);
                check.cuboid("plate", &c.plate);
                check.cylinder("wheel", &c.wheel);
                check.cylinder("rotor", &c.rotor);
                check.cylinder("axle", &c.axle);
            }
            RigConfig::Simple(c) => {
                check.finite("wheel_x", c.wheel_x);
                check.finite("wheel_z", c.wheel_z);
                check.finite("ride_height", c.ride_height);
                check.finite("plate_y", c.plate_y);
                check.finite("rotor_pivot", c.rotor_pivot);
                check.finite("axle_pivot", c.axle_pivot);
                check.finite("drive_velocity", c.drive_velocity);
                check.non_negative("coast_max_impulse", c.coast_max_impulse);
                check.cuboid("plate", &c.plate);
                check.cylinder("wheel", &c.wheel);
                check.cylinder("rotor", &c.rotor);
                check.cylinder("axle", &c.axle);
            }
            RigConfig::Steered(c) => {
                check.positive("track_width", c.track_width);
                check.positive("wheelbase", c.wheelbase);
                check.finite("ride_height", c.ride_height);
                check.finite("chassis_clearance", c.chassis_clearance);
                check.finite("spring_offset", c.spring_offset);
                check.non_negative("spring_travel", c.spring_travel);
                check.non_negative("spring_stiffness", c.spring_stiffness);
                check.non_negative("spring_damping", c.spring_damping);
                check.non_negative("steer_limit", c.steer_limit);
                check.non_negative("steer_max_impulse", c.steer_max_impulse);
                check.non_negative("drive_idle_max_impulse", c.drive_idle_max_impulse);
                check.cuboid("chassis", &c.chassis);
                check.cylinder("axle", &c.axle);
                check.cylinder("wheel", &c.wheel);
            }
        }
        check.finish("rig config")
    }
}

/// Collects the first bad field.
#[derive(Default)]
struct Check {
    failure: Option<(String, &'static str)>,
}

impl Check {
    fn fail(&mut self, field: &str, reason: &'static str) {
        if self.failure.is_none() {
            self.failure = Some((field.to_owned(), reason));
        }
    }

    fn finite(&mut self, field: &str, value: Real) {
        if !value.is_finite() {
            self.fail(field, "must be finite");
        }
    }

    fn positive(&mut self, field: &str, value: Real) {
        if !(value.is_finite() && value > 0.0) {
            self.fail(field, "must be finite and > 0");
        }
    }

    fn non_negative(&mut self, field: &str, value: Real) {
        if !(value.is_finite() && value >= 0.0) {
            self.fail(field, "must be finite and >= 0");
        }
    }

    fn cuboid(&mut self, name: &str, dims: &BoxDims) {
        self.positive(&format!("{}.width", name), dims.width);
        self.positive(&format!("{}.height", name), dims.height);
        self.positive(&format!("{}.depth", name), dims.depth);
        self.positive(&format!("{}.mass", name), dims.mass);
    }

    fn cylinder(&mut self, name: &str, dims: &CylinderDims) {
        self.positive(&format!("{}.radius", name), dims.radius);
        self.positive(&format!("{}.width", name), dims.width);
        self.positive(&format!("{}.mass", name), dims.mass);
    }

    fn finish(self, scope: &str) -> Result<(), RigError> {
        match self.failure {
            Some((field, reason)) => Err(RigError::construction(format!("{} field {}", scope, field), reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(
            r#"{ "variant": "mecanum", "mecanum": { "wheel_x": 1.7 }, "tuning": { "steered_speed": 80.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.variant, Variant::Mecanum);
        assert_eq!(config.mecanum.wheel_x, 1.7);
        assert_eq!(config.mecanum.wheel_z, 2.0);
        assert_eq!(config.tuning.steered_speed, 80.0);
        assert_eq!(config.tuning.steered_coast_max_impulse, 0.2);
        assert_eq!(config.ground.texture_repeat, [20, 20]);
        assert!(matches!(config.rig(), RigConfig::Mecanum(_)));
    }

    #[test]
    fn rejects_unknown_variant() {
        assert!(SceneConfig::from_json_str(r#"{ "variant": "tank" }"#).is_err());
        assert!("tank".parse::<Variant>().is_err());
        assert_eq!("simple".parse::<Variant>().unwrap(), Variant::Simple);
    }

    #[test]
    fn defaults_validate() {
        for variant in [Variant::Mecanum, Variant::Simple, Variant::Steered] {
            let rig = SceneConfig::for_variant(variant).rig();
            assert_eq!(rig.variant(), variant);
            assert_eq!(rig.validate(), Ok(()));
        }
    }

    #[test]
    fn validation_names_first_bad_field() {
        let mut steered = SteeredConfig::default();
        steered.wheel.radius = 0.0;
        steered.chassis.mass = -1.0;
        let err = RigConfig::Steered(steered).validate().unwrap_err();
        assert_eq!(
            err,
            RigError::construction("rig config field chassis.mass", "must be finite and > 0")
        );

        let mut mecanum = MecanumConfig::default();
        mecanum.wheel_x = Real::INFINITY;
        assert!(RigConfig::Mecanum(mecanum).validate().is_err());
    }

    #[test]
    fn tuning_rejects_zero_dt_and_nan_targets() {
        assert_eq!(ControlTuning::default().validate(), Ok(()));

        let config = SceneConfig::from_json_str(r#"{ "tuning": { "steered_steer_dt": 0.0 } }"#).unwrap();
        assert_eq!(
            config.tuning.validate(),
            Err(RigError::construction("tuning field steered_steer_dt", "must be finite and > 0"))
        );

        let mut tuning = ControlTuning::default();
        tuning.mecanum_steer_target = Real::NAN;
        assert!(tuning.validate().is_err());
    }
}
