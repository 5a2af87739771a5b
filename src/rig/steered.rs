use std::f64::consts::PI;

use rapier3d_f64::prelude::*;

use super::{with_limits, with_motor, world_hinge, Assembly, MotorPair, Motors, VehicleRig};
use crate::backend::{AxisLimits, BodyDesc, ConstraintDesc, ConstraintKind, HingeLimits, HingeMotor, PhysicsBackend};
use crate::config::{SteeredConfig, Variant};
use crate::error::RigError;

/// Chassis on a sprung rear axle and a steering hinge at the front axle.
/// Rear wheels drive, front wheels roll free. Front is -Z, right is +X.
pub(super) fn build<B: PhysicsBackend>(mut asm: Assembly<'_, B>, c: &SteeredConfig) -> Result<VehicleRig, RigError> {
    let y = c.ride_height;
    let chassis_y = y + c.chassis_clearance;
    let half_track = c.track_width / 2.0;
    let half_base = c.wheelbase / 2.0;

    let chassis = asm.body(
        BodyDesc::cuboid("chassis", c.chassis.width, c.chassis.height, c.chassis.depth, c.chassis.mass)
            .at(0.0, chassis_y, 0.0),
    )?;

    let axle = |name: &str, z: Real| {
        BodyDesc::cylinder(name, c.axle.radius, c.axle.width, c.axle.mass)
            .sideways()
            .at(0.0, y, z)
    };
    let front_axle = asm.body(axle("axle_front", -half_base))?;
    let back_axle = asm.body(axle("axle_back", half_base))?;

    let wheel = |name: &str, x: Real, z: Real| {
        BodyDesc::cylinder(name, c.wheel.radius, c.wheel.width, c.wheel.mass)
            .sideways()
            .at(x, y, z)
    };
    let front_right = asm.body(wheel("wheel_front_right", half_track, -half_base))?;
    let front_left = asm.body(wheel("wheel_front_left", -half_track, -half_base))?;
    let back_right = asm.body(wheel("wheel_back_right", half_track, half_base))?;
    let back_left = asm.body(wheel("wheel_back_left", -half_track, half_base))?;

    // rear suspension: two springs either side of the centre line
    for (side, dx) in [("right", c.spring_offset), ("left", -c.spring_offset)] {
        let spring = ConstraintKind::Spring {
            linear: AxisLimits::symmetric(0.0, c.spring_travel, 0.0),
            angular: AxisLimits::symmetric(0.0, PI, 0.0),
            stiffness: c.spring_stiffness,
            damping: c.spring_damping,
            angular_lock: false,
            offset: vector![dx, y - chassis_y, half_base],
        };
        asm.constraint(ConstraintDesc::new(
            format!("chassis/axle_back/{}", side),
            chassis.handle,
            back_axle.handle,
            spring,
        ))?;
    }

    let steer = world_hinge(&chassis, &front_axle, point![0.0, y, -half_base], Vector::y());
    let steer = with_limits(steer, HingeLimits::symmetric(c.steer_limit));
    let steer = with_motor(
        steer,
        HingeMotor {
            enabled: true,
            target_velocity: 0.0,
            max_impulse: c.steer_max_impulse,
        },
    );
    let steering = asm.constraint(ConstraintDesc::new("chassis/axle_front", chassis.handle, front_axle.handle, steer))?;

    // wheels spin about -X so a positive rate rolls the car towards -Z
    let spin = -Vector::x();
    for (name, wheel) in [("wheel_front_right", &front_right), ("wheel_front_left", &front_left)] {
        let pivot = Point::from(wheel.pose.translation.vector);
        let hinge = world_hinge(&front_axle, wheel, pivot, spin);
        asm.constraint(ConstraintDesc::new(format!("axle_front/{}", name), front_axle.handle, wheel.handle, hinge))?;
    }

    let idle = HingeMotor {
        enabled: true,
        target_velocity: 0.0,
        max_impulse: c.drive_idle_max_impulse,
    };
    let mut drive = Vec::with_capacity(2);
    for (name, wheel) in [("wheel_back_right", &back_right), ("wheel_back_left", &back_left)] {
        let pivot = Point::from(wheel.pose.translation.vector);
        let hinge = with_motor(world_hinge(&back_axle, wheel, pivot, spin), idle);
        drive.push(asm.constraint(ConstraintDesc::new(format!("axle_back/{}", name), back_axle.handle, wheel.handle, hinge))?);
    }
    let drive = MotorPair { right: drive[0], left: drive[1] };

    Ok(asm.finish(Variant::Steered, chassis.handle, Motors::Steered { steering, drive }))
}
