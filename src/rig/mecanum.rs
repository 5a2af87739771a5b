use rapier3d_f64::prelude::*;

use super::{running_gear, yoke, Assembly, Motors, VehicleRig};
use crate::backend::{AxisLimits, BodyDesc, ConstraintDesc, ConstraintKind, HingeMotor, PhysicsBackend};
use crate::config::{MecanumConfig, Variant};
use crate::error::RigError;

/// Four yoke axles hang off the plate, two per wheel line. The inner front
/// yoke is sprung and its hinges steer; the rest are welded.
pub(super) fn build<B: PhysicsBackend>(mut asm: Assembly<'_, B>, c: &MecanumConfig) -> Result<VehicleRig, RigError> {
    let y = c.ride_height;
    let drive_motor = HingeMotor {
        enabled: true,
        target_velocity: c.drive_velocity,
        max_impulse: c.drive_max_impulse,
    };
    let (gear, drive) = running_gear(&mut asm, c.wheel_x, c.wheel_z, y, &c.wheel, &c.rotor, drive_motor)?;

    let axle = |name: &str, z: Real| {
        BodyDesc::cylinder(name, c.axle.radius, c.axle.width, c.axle.mass)
            .sideways()
            .at(0.0, y, z)
    };
    let back_outer = asm.body(axle("axle_back_outer", c.wheel_z + c.axis_z))?;
    let back_inner = asm.body(axle("axle_back_inner", c.wheel_z - c.axis_z))?;
    let front_inner = asm.body(axle("axle_front_inner", -c.wheel_z + c.axis_z))?;
    let front_outer = asm.body(axle("axle_front_outer", -c.wheel_z - c.axis_z))?;

    let rotors = &gear.rotors;
    let steer_motor = HingeMotor {
        enabled: true,
        target_velocity: 0.0,
        max_impulse: c.steer_max_impulse,
    };
    yoke(&mut asm, "axle_back_outer", &rotors.back_right, &rotors.back_left, &back_outer, c.axis_z, c.rotor_pivot, c.axle_pivot, None)?;
    yoke(&mut asm, "axle_back_inner", &rotors.back_right, &rotors.back_left, &back_inner, -c.axis_z, c.rotor_pivot, c.axle_pivot, None)?;
    let steer = yoke(
        &mut asm,
        "axle_front_inner",
        &rotors.front_right,
        &rotors.front_left,
        &front_inner,
        c.axis_z,
        c.rotor_pivot,
        c.axle_pivot,
        Some(steer_motor),
    )?;
    yoke(&mut asm, "axle_front_outer", &rotors.front_right, &rotors.front_left, &front_outer, -c.axis_z, c.rotor_pivot, c.axle_pivot, None)?;

    let plate = asm.body(
        BodyDesc::cuboid("plate", c.plate.width, c.plate.height, c.plate.depth, c.plate.mass).at(0.0, c.plate_y, 0.0),
    )?;
    for (name, axle) in [
        ("axle_back_outer", &back_outer),
        ("axle_back_inner", &back_inner),
        ("axle_front_outer", &front_outer),
    ] {
        asm.constraint(ConstraintDesc::new(format!("plate/{}", name), plate.handle, axle.handle, ConstraintKind::Lock))?;
    }

    // vertical travel only, a tenth of it sideways
    let travel = c.suspension_travel;
    for (side, dy) in [("upper", c.suspension_offset), ("lower", -c.suspension_offset)] {
        let dof = ConstraintKind::Dof {
            linear: AxisLimits::symmetric(travel / 10.0, travel, travel / 10.0),
            angular: AxisLimits::locked(),
            offset: vector![0.0, dy, 0.0],
        };
        asm.constraint(ConstraintDesc::new(
            format!("plate/axle_front_inner/{}", side),
            plate.handle,
            front_inner.handle,
            dof,
        ))?;
    }

    Ok(asm.finish(Variant::Mecanum, plate.handle, Motors::Mecanum { drive, steer }))
}
