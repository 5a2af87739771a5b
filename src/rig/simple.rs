use super::{running_gear, yoke, Assembly, Motors, VehicleRig};
use crate::backend::{BodyDesc, ConstraintDesc, ConstraintKind, HingeMotor, PhysicsBackend};
use crate::config::{SimpleConfig, Variant};
use crate::error::RigError;

/// One axle per wheel line, both welded to the plate. No suspension, no
/// steering; the rear wheels turn at a constant rate with a weak motor.
pub(super) fn build<B: PhysicsBackend>(mut asm: Assembly<'_, B>, c: &SimpleConfig) -> Result<VehicleRig, RigError> {
    let y = c.ride_height;
    let coast = HingeMotor {
        enabled: true,
        target_velocity: c.drive_velocity,
        max_impulse: c.coast_max_impulse,
    };
    let (gear, drive) = running_gear(&mut asm, c.wheel_x, c.wheel_z, y, &c.wheel, &c.rotor, coast)?;

    let axle = |name: &str, z| {
        BodyDesc::cylinder(name, c.axle.radius, c.axle.width, c.axle.mass)
            .sideways()
            .at(0.0, y, z)
    };
    let back = asm.body(axle("axle_back", c.wheel_z))?;
    let front = asm.body(axle("axle_front", -c.wheel_z))?;

    let rotors = &gear.rotors;
    yoke(&mut asm, "axle_back", &rotors.back_right, &rotors.back_left, &back, 0.0, c.rotor_pivot, c.axle_pivot, None)?;
    yoke(&mut asm, "axle_front", &rotors.front_right, &rotors.front_left, &front, 0.0, c.rotor_pivot, c.axle_pivot, None)?;

    let plate = asm.body(
        BodyDesc::cuboid("plate", c.plate.width, c.plate.height, c.plate.depth, c.plate.mass).at(0.0, c.plate_y, 0.0),
    )?;
    asm.constraint(ConstraintDesc::new("plate/axle_back", plate.handle, back.handle, ConstraintKind::Lock))?;
    asm.constraint(ConstraintDesc::new("plate/axle_front", plate.handle, front.handle, ConstraintKind::Lock))?;

    Ok(asm.finish(Variant::Simple, plate.handle, Motors::Simple { drive }))
}
