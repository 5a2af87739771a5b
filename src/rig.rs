//! Vehicle rigs: which bodies exist and which constraint kind joins which
//! pair. Each variant lives in its own module; this one holds the shared
//! record and the assembly bookkeeping.

use rapier3d_f64::prelude::*;
use tracing::{debug, info};

use crate::backend::{
    BodyDesc, BodyHandle, ConstraintDesc, ConstraintHandle, ConstraintKind, ConstraintType, HingeLimits,
    HingeMotor, PhysicsBackend,
};
use crate::config::{RigConfig, Variant};
use crate::error::RigError;

mod mecanum;
mod simple;
mod steered;

#[derive(Clone, Debug, PartialEq)]
pub struct RigBody {
    pub name: String,
    pub handle: BodyHandle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RigConstraint {
    pub name: String,
    pub ty: ConstraintType,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub handle: ConstraintHandle,
}

/// Left/right pair of motorized hinges.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotorPair {
    pub left: ConstraintHandle,
    pub right: ConstraintHandle,
}

impl MotorPair {
    pub fn both(&self) -> [ConstraintHandle; 2] {
        [self.left, self.right]
    }
}

/// The constraints the control loop is allowed to touch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Motors {
    /// `drive` spins the rear wheels at a fixed rate, `steer` twists the
    /// front yoke.
    Mecanum { drive: MotorPair, steer: MotorPair },
    Simple { drive: MotorPair },
    Steered { steering: ConstraintHandle, drive: MotorPair },
}

impl Motors {
    pub fn all(&self) -> Vec<ConstraintHandle> {
        match self {
            Motors::Mecanum { drive, steer } => [drive.both(), steer.both()].concat(),
            Motors::Simple { drive } => drive.both().to_vec(),
            Motors::Steered { steering, drive } => {
                let mut all = vec![*steering];
                all.extend(drive.both());
                all
            }
        }
    }
}

/// A built vehicle. Topology is fixed once this exists; only the motors in
/// [`Motors`] change afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRig {
    pub variant: Variant,
    pub chassis: BodyHandle,
    pub bodies: Vec<RigBody>,
    pub constraints: Vec<RigConstraint>,
    pub motors: Motors,
}

impl VehicleRig {
    pub fn body(&self, name: &str) -> Option<BodyHandle> {
        self.bodies.iter().find(|body| body.name == name).map(|body| body.handle)
    }

    pub fn constraint(&self, name: &str) -> Option<ConstraintHandle> {
        self.constraints.iter().find(|c| c.name == name).map(|c| c.handle)
    }

    pub fn count(&self, ty: ConstraintType) -> usize {
        self.constraints.iter().filter(|c| c.ty == ty).count()
    }
}

/// Builds one vehicle and registers every part with `backend`.
///
/// Fails on the first part the engine rejects. Whatever was registered
/// before the failure stays in the engine, so the caller has to throw the
/// whole scene away.
pub fn build<B: PhysicsBackend>(backend: &mut B, config: &RigConfig, debug: bool) -> Result<VehicleRig, RigError> {
    config.validate()?;

    let assembly = Assembly::new(backend, debug);
    let rig = match config {
        RigConfig::Mecanum(config) => mecanum::build(assembly, config)?,
        RigConfig::Simple(config) => simple::build(assembly, config)?,
        RigConfig::Steered(config) => steered::build(assembly, config)?,
    };

    info!(
        variant = ?rig.variant,
        bodies = rig.bodies.len(),
        constraints = rig.constraints.len(),
        "rig built"
    );
    Ok(rig)
}

/// A registered body and the pose it was created at.
#[derive(Clone, Copy, Debug)]
struct Part {
    handle: BodyHandle,
    pose: Isometry<Real>,
}

struct Assembly<'a, B> {
    backend: &'a mut B,
    debug: bool,
    bodies: Vec<RigBody>,
    constraints: Vec<RigConstraint>,
}

impl<'a, B: PhysicsBackend> Assembly<'a, B> {
    fn new(backend: &'a mut B, debug: bool) -> Self {
        Assembly {
            backend,
            debug,
            bodies: Vec::new(),
            constraints: Vec::new(),
        }
    }

    fn body(&mut self, desc: BodyDesc) -> Result<Part, RigError> {
        let handle = self.backend.create_body(&desc)?;
        if self.debug {
            debug!(name = %desc.name, %handle, shape = ?desc.shape, mass = desc.mass, "body");
        }
        self.bodies.push(RigBody { name: desc.name, handle });
        Ok(Part { handle, pose: desc.pose })
    }

    fn constraint(&mut self, desc: ConstraintDesc) -> Result<ConstraintHandle, RigError> {
        let handle = self.backend.create_constraint(&desc)?;
        if self.debug {
            debug!(name = %desc.name, %handle, kind = ?desc.kind.ty(), a = %desc.body_a, b = %desc.body_b, "constraint");
        }
        self.constraints.push(RigConstraint {
            name: desc.name,
            ty: desc.kind.ty(),
            body_a: desc.body_a,
            body_b: desc.body_b,
            handle,
        });
        Ok(handle)
    }

    fn finish(self, variant: Variant, chassis: BodyHandle, motors: Motors) -> VehicleRig {
        VehicleRig {
            variant,
            chassis,
            bodies: self.bodies,
            constraints: self.constraints,
            motors,
        }
    }
}

/// Hinge through `pivot` about `axis`, both in world space, expressed in
/// each body's local frame.
fn world_hinge(a: &Part, b: &Part, pivot: Point<Real>, axis: Vector<Real>) -> ConstraintKind {
    ConstraintKind::Hinge {
        pivot_a: a.pose.inverse_transform_point(&pivot),
        pivot_b: b.pose.inverse_transform_point(&pivot),
        axis_a: a.pose.inverse_transform_vector(&axis),
        axis_b: b.pose.inverse_transform_vector(&axis),
        limits: None,
        motor: None,
    }
}

fn with_motor(kind: ConstraintKind, motor: HingeMotor) -> ConstraintKind {
    match kind {
        ConstraintKind::Hinge { pivot_a, pivot_b, axis_a, axis_b, limits, .. } => ConstraintKind::Hinge {
            pivot_a,
            pivot_b,
            axis_a,
            axis_b,
            limits,
            motor: Some(motor),
        },
        other => other,
    }
}

fn with_limits(kind: ConstraintKind, limits: HingeLimits) -> ConstraintKind {
    match kind {
        ConstraintKind::Hinge { pivot_a, pivot_b, axis_a, axis_b, motor, .. } => ConstraintKind::Hinge {
            pivot_a,
            pivot_b,
            axis_a,
            axis_b,
            limits: Some(limits),
            motor,
        },
        other => other,
    }
}

/// Wheels and rotors shared by the mecanum and simple rigs.
struct RunningGear {
    wheels: Corners,
    rotors: Corners,
}

#[derive(Clone, Copy)]
struct Corners {
    back_right: Part,
    back_left: Part,
    front_right: Part,
    front_left: Part,
}

impl Corners {
    fn named(&self) -> [(&'static str, Part); 4] {
        [
            ("back_right", self.back_right),
            ("back_left", self.back_left),
            ("front_right", self.front_right),
            ("front_left", self.front_left),
        ]
    }
}

/// Wheel and rotor at each corner, wheel spinning freely on its rotor
/// except the rear pair, which gets `rear_motor`. Back is +Z, right is +X.
fn running_gear<B: PhysicsBackend>(
    asm: &mut Assembly<'_, B>,
    wheel_x: Real,
    wheel_z: Real,
    y: Real,
    wheel: &crate::config::CylinderDims,
    rotor: &crate::config::CylinderDims,
    rear_motor: HingeMotor,
) -> Result<(RunningGear, MotorPair), RigError> {
    let corners = [
        ("back_right", wheel_x, wheel_z),
        ("back_left", -wheel_x, wheel_z),
        ("front_right", wheel_x, -wheel_z),
        ("front_left", -wheel_x, -wheel_z),
    ];

    let mut wheels = Vec::with_capacity(4);
    for (corner, x, z) in corners {
        let desc = BodyDesc::cylinder(format!("wheel_{}", corner), wheel.radius, wheel.width, wheel.mass)
            .sideways()
            .at(x, y, z);
        wheels.push(asm.body(desc)?);
    }
    let mut rotors = Vec::with_capacity(4);
    for (corner, x, z) in corners {
        let desc = BodyDesc::cylinder(format!("rotor_{}", corner), rotor.radius, rotor.width, rotor.mass)
            .sideways()
            .at(x, y, z);
        rotors.push(asm.body(desc)?);
    }

    let gear = RunningGear {
        wheels: Corners { back_right: wheels[0], back_left: wheels[1], front_right: wheels[2], front_left: wheels[3] },
        rotors: Corners { back_right: rotors[0], back_left: rotors[1], front_right: rotors[2], front_left: rotors[3] },
    };

    let mut rear = Vec::with_capacity(2);
    for ((corner, wheel), (_, rotor)) in gear.wheels.named().into_iter().zip(gear.rotors.named()) {
        let mut kind = ConstraintKind::hinge(Vector::y(), Vector::y());
        if corner.starts_with("back") {
            kind = with_motor(kind, rear_motor);
        }
        let name = format!("wheel_{}/rotor", corner);
        let handle = asm.constraint(ConstraintDesc::new(name, wheel.handle, rotor.handle, kind))?;
        if corner.starts_with("back") {
            rear.push(handle);
        }
    }

    // back_right was registered first
    let drive = MotorPair { right: rear[0], left: rear[1] };
    Ok((gear, drive))
}

/// Hinges a left/right rotor pair onto a yoke axle. `dz` is where the axle
/// sits relative to the rotors, along Z.
fn yoke<B: PhysicsBackend>(
    asm: &mut Assembly<'_, B>,
    name: &str,
    right: &Part,
    left: &Part,
    axle: &Part,
    dz: Real,
    rotor_pivot: Real,
    axle_pivot: Real,
    motor: Option<HingeMotor>,
) -> Result<MotorPair, RigError> {
    let side = |pivot_a: Point<Real>, pivot_b: Point<Real>| ConstraintKind::Hinge {
        pivot_a,
        pivot_b,
        axis_a: Vector::x(),
        axis_b: Vector::x(),
        limits: None,
        motor,
    };

    let right = asm.constraint(ConstraintDesc::new(
        format!("{}/rotor_right", name),
        right.handle,
        axle.handle,
        side(point![0.0, rotor_pivot, dz], point![0.0, -axle_pivot, 0.0]),
    ))?;
    let left = asm.constraint(ConstraintDesc::new(
        format!("{}/rotor_left", name),
        left.handle,
        axle.handle,
        side(point![0.0, -rotor_pivot, dz], point![0.0, axle_pivot, 0.0]),
    ))?;

    Ok(MotorPair { left, right })
}
