//! The engine surface a rig is assembled against.
//!
//! Handles are plain ids handed out by the backend. Bodies and constraints
//! get separate types so a constraint can never be passed where a body is
//! expected.

use core::fmt;

use rapier3d_f64::prelude::*;

use crate::error::RigError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BodyHandle(pub u32);
impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyHandle({})", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConstraintHandle(pub u32);
impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstraintHandle({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Cuboid { width: Real, height: Real, depth: Real },
    /// Along the body's local Y axis, like the engine's primitive.
    Cylinder { radius: Real, height: Real },
}

#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub name: String,
    pub shape: Shape,
    /// Zero makes the body static.
    pub mass: Real,
    pub pose: Isometry<Real>,
    pub friction: Option<Real>,
}

impl BodyDesc {
    pub fn cuboid(name: impl Into<String>, width: Real, height: Real, depth: Real, mass: Real) -> Self {
        BodyDesc {
            name: name.into(),
            shape: Shape::Cuboid { width, height, depth },
            mass,
            pose: Isometry::identity(),
            friction: None,
        }
    }

    pub fn cylinder(name: impl Into<String>, radius: Real, height: Real, mass: Real) -> Self {
        BodyDesc {
            name: name.into(),
            shape: Shape::Cylinder { radius, height },
            mass,
            pose: Isometry::identity(),
            friction: None,
        }
    }

    pub fn at(mut self, x: Real, y: Real, z: Real) -> Self {
        self.pose.translation.vector = vector![x, y, z];
        self
    }

    /// Lays a cylinder on its side so its axis runs along world X.
    pub fn sideways(mut self) -> Self {
        self.pose.rotation = Rotation::from_scaled_axis(vector![0.0, 0.0, std::f64::consts::FRAC_PI_2]);
        self
    }

    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn validate(&self) -> Result<(), RigError> {
        let what = format!("body {}", self.name);
        let dims = match self.shape {
            Shape::Cuboid { width, height, depth } => vec![width, height, depth],
            Shape::Cylinder { radius, height } => vec![radius, height],
        };
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(RigError::construction(what, "dimensions must be finite and > 0"));
        }
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(RigError::construction(what, "mass must be finite and >= 0"));
        }
        let t = self.pose.translation.vector;
        if !(t.x.is_finite() && t.y.is_finite() && t.z.is_finite()) {
            return Err(RigError::construction(what, "position must be finite"));
        }
        Ok(())
    }
}

/// Angular limits of a hinge, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HingeLimits {
    pub lower: Real,
    pub upper: Real,
    pub softness: Real,
    pub bias_factor: Real,
}

impl HingeLimits {
    pub fn new(lower: Real, upper: Real) -> Self {
        HingeLimits { lower, upper, softness: 0.9, bias_factor: 0.3 }
    }

    pub fn symmetric(bound: Real) -> Self {
        HingeLimits::new(-bound, bound)
    }
}

/// Velocity motor settings applied when a hinge is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HingeMotor {
    pub enabled: bool,
    pub target_velocity: Real,
    pub max_impulse: Real,
}

/// Per-axis travel, `lower[i] == upper[i]` locks axis `i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLimits {
    pub lower: Vector<Real>,
    pub upper: Vector<Real>,
}

impl AxisLimits {
    pub fn locked() -> Self {
        AxisLimits { lower: Vector::zeros(), upper: Vector::zeros() }
    }

    pub fn symmetric(x: Real, y: Real, z: Real) -> Self {
        AxisLimits { lower: vector![-x, -y, -z], upper: vector![x, y, z] }
    }

    pub fn is_locked(&self, axis: usize) -> bool {
        self.lower[axis] == self.upper[axis]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintKind {
    /// The second body's frame follows the relative pose at creation, so a
    /// new hinge sits at angle 0. `axis_b` has to agree with that pose.
    Hinge {
        pivot_a: Point<Real>,
        pivot_b: Point<Real>,
        axis_a: Vector<Real>,
        axis_b: Vector<Real>,
        limits: Option<HingeLimits>,
        motor: Option<HingeMotor>,
    },
    /// Welds the relative pose the two bodies have right now.
    Lock,
    Spring {
        linear: AxisLimits,
        angular: AxisLimits,
        stiffness: Real,
        damping: Real,
        angular_lock: bool,
        offset: Vector<Real>,
    },
    Dof {
        linear: AxisLimits,
        angular: AxisLimits,
        offset: Vector<Real>,
    },
    Slider {
        axis: Vector<Real>,
        lower: Real,
        upper: Real,
    },
}

/// Discriminant of [`ConstraintKind`], for counting and reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConstraintType {
    Hinge,
    Lock,
    Spring,
    Dof,
    Slider,
}

impl ConstraintKind {
    /// Hinge along a shared axis with the pivots at both body origins.
    pub fn hinge(axis_a: Vector<Real>, axis_b: Vector<Real>) -> Self {
        ConstraintKind::Hinge {
            pivot_a: Point::origin(),
            pivot_b: Point::origin(),
            axis_a,
            axis_b,
            limits: None,
            motor: None,
        }
    }

    pub fn ty(&self) -> ConstraintType {
        match self {
            ConstraintKind::Hinge { .. } => ConstraintType::Hinge,
            ConstraintKind::Lock => ConstraintType::Lock,
            ConstraintKind::Spring { .. } => ConstraintType::Spring,
            ConstraintKind::Dof { .. } => ConstraintType::Dof,
            ConstraintKind::Slider { .. } => ConstraintType::Slider,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintDesc {
    pub name: String,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub kind: ConstraintKind,
}

impl ConstraintDesc {
    pub fn new(name: impl Into<String>, body_a: BodyHandle, body_b: BodyHandle, kind: ConstraintKind) -> Self {
        ConstraintDesc { name: name.into(), body_a, body_b, kind }
    }

    /// Geometry checks that don't need the engine. Endpoint existence is the
    /// backend's job.
    pub fn validate(&self) -> Result<(), RigError> {
        let what = format!("constraint {}", self.name);
        if self.body_a == self.body_b {
            return Err(RigError::construction(what, "endpoints must be two different bodies"));
        }
        let bad_axis = |v: &Vector<Real>| !v.iter().all(|c| c.is_finite()) || v.norm() == 0.0;
        let bad_limits = |l: &AxisLimits| (0..3).any(|i| !(l.lower[i] <= l.upper[i]));
        match &self.kind {
            ConstraintKind::Hinge { axis_a, axis_b, limits, motor, .. } => {
                if bad_axis(axis_a) || bad_axis(axis_b) {
                    return Err(RigError::construction(what, "hinge axes must be non-zero"));
                }
                if let Some(limits) = limits {
                    if !(limits.lower <= limits.upper) {
                        return Err(RigError::construction(what, "hinge lower limit above upper"));
                    }
                }
                if let Some(motor) = motor {
                    if !(motor.max_impulse >= 0.0) {
                        return Err(RigError::construction(what, "motor max impulse must be >= 0"));
                    }
                }
            }
            ConstraintKind::Lock => {}
            ConstraintKind::Spring { linear, angular, stiffness, damping, .. } => {
                if bad_limits(linear) || bad_limits(angular) {
                    return Err(RigError::construction(what, "spring lower limit above upper"));
                }
                if !(*stiffness >= 0.0 && *damping >= 0.0) {
                    return Err(RigError::construction(what, "stiffness and damping must be >= 0"));
                }
            }
            ConstraintKind::Dof { linear, angular, .. } => {
                if bad_limits(linear) || bad_limits(angular) {
                    return Err(RigError::construction(what, "dof lower limit above upper"));
                }
            }
            ConstraintKind::Slider { axis, lower, upper } => {
                if bad_axis(axis) {
                    return Err(RigError::construction(what, "slider axis must be non-zero"));
                }
                if !(lower <= upper) {
                    return Err(RigError::construction(what, "slider lower limit above upper"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotorDrive {
    Velocity(Real),
    /// Drive towards `angle`, reaching it in roughly `dt` seconds.
    Position { angle: Real, dt: Real },
}

/// What a hinge motor was last told to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorState {
    pub enabled: bool,
    /// Infinite while the engine's default bound applies.
    pub max_impulse: Real,
    pub drive: MotorDrive,
}

impl MotorState {
    pub fn target_velocity(&self) -> Option<Real> {
        match self.drive {
            MotorDrive::Velocity(v) => Some(v),
            MotorDrive::Position { .. } => None,
        }
    }

    pub fn target_angle(&self) -> Option<Real> {
        match self.drive {
            MotorDrive::Position { angle, .. } => Some(angle),
            MotorDrive::Velocity(_) => None,
        }
    }
}

/// Static ground slab whose top face sits at `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundDesc {
    pub width: Real,
    pub depth: Real,
    pub y: Real,
    pub friction: Real,
}

/// Capabilities the rig builder and control loop need from a physics engine.
pub trait PhysicsBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, RigError>;

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> Result<ConstraintHandle, RigError>;

    /// Velocity motor. `max_impulse` bounds the impulse per step.
    fn set_motor(
        &mut self,
        constraint: ConstraintHandle,
        enabled: bool,
        target_velocity: Real,
        max_impulse: Real,
    ) -> Result<(), RigError>;

    /// Position motor. Keeps the impulse bound of the last `set_motor`.
    fn set_motor_target(&mut self, constraint: ConstraintHandle, target_angle: Real, dt: Real) -> Result<(), RigError>;

    fn set_constraint_limits(&mut self, constraint: ConstraintHandle, limits: HingeLimits) -> Result<(), RigError>;

    fn apply_impulse(&mut self, body: BodyHandle, axis: Vector<Real>, magnitude: Real) -> Result<(), RigError>;

    fn create_ground_plane(&mut self, desc: &GroundDesc) -> Result<BodyHandle, RigError>;

    /// Advances the simulation by one fixed step.
    fn step(&mut self);

    fn body_pose(&self, body: BodyHandle) -> Option<Isometry<Real>>;

    fn motor_state(&self, constraint: ConstraintHandle) -> Option<MotorState>;

    fn constraint_limits(&self, constraint: ConstraintHandle) -> Option<HingeLimits>;

    fn body_count(&self) -> usize;

    fn constraint_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_bodies() {
        assert!(BodyDesc::cylinder("wheel", 0.5, 0.35, 20.0).validate().is_ok());
        assert!(BodyDesc::cuboid("ground", 1.0, 1.0, 1.0, 0.0).validate().is_ok());

        let flat = BodyDesc::cylinder("wheel", 0.0, 0.35, 20.0);
        assert!(matches!(flat.validate(), Err(RigError::Construction { .. })));

        let heavy = BodyDesc::cuboid("plate", 1.8, 0.25, 4.7, -1.0);
        assert!(matches!(heavy.validate(), Err(RigError::Construction { .. })));

        let lost = BodyDesc::cuboid("plate", 1.8, 0.25, 4.7, 50.0).at(Real::NAN, 0.0, 0.0);
        assert!(matches!(lost.validate(), Err(RigError::Construction { .. })));
    }

    #[test]
    fn rejects_inverted_limits_and_self_joints() {
        let a = BodyHandle(0);
        let b = BodyHandle(1);

        let dof = ConstraintKind::Dof {
            linear: AxisLimits { lower: vector![0.0, 0.2, 0.0], upper: vector![0.0, -0.2, 0.0] },
            angular: AxisLimits::locked(),
            offset: Vector::zeros(),
        };
        assert!(ConstraintDesc::new("dof", a, b, dof).validate().is_err());

        let hinge = ConstraintKind::hinge(Vector::y(), Vector::y());
        assert!(ConstraintDesc::new("self", a, a, hinge.clone()).validate().is_err());
        assert!(ConstraintDesc::new("ok", a, b, hinge).validate().is_ok());

        let limp = ConstraintKind::hinge(Vector::zeros(), Vector::y());
        assert!(ConstraintDesc::new("limp", a, b, limp).validate().is_err());
    }

    #[test]
    fn sideways_cylinder_points_along_x() {
        let wheel = BodyDesc::cylinder("wheel", 0.5, 0.35, 20.0).sideways();
        let axis = wheel.pose.rotation * Vector::y();
        assert!((axis.x.abs() - 1.0).abs() < 1e-12);
        assert!(axis.y.abs() < 1e-12);
    }
}
