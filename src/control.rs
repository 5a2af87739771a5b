//! Per-tick mapping from held keys to motor commands.
//!
//! [`plan`] is a pure function of the input state, so calling it twice with
//! the same keys produces the same commands. The only persistent state is the
//! input flags and whatever the motors were last told.

use rapier3d_f64::prelude::*;
use tracing::trace;

use crate::backend::{BodyHandle, ConstraintHandle, PhysicsBackend};
use crate::config::ControlTuning;
use crate::error::RigError;
use crate::input::InputState;
use crate::rig::{MotorPair, Motors, VehicleRig};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Actuation {
    Velocity {
        constraint: ConstraintHandle,
        enabled: bool,
        target: Real,
        max_impulse: Real,
    },
    /// Targets are sent as-is; the hinge's own limits do the clamping.
    Target {
        constraint: ConstraintHandle,
        angle: Real,
        dt: Real,
    },
    Impulse {
        body: BodyHandle,
        axis: Vector<Real>,
        magnitude: Real,
    },
}

/// Left/right as -1, 0 or +1. Left wins if both are held.
fn steer_sign(input: &InputState) -> Real {
    if input.left {
        -1.0
    } else if input.right {
        1.0
    } else {
        0.0
    }
}

fn target_pair(pair: &MotorPair, angle: Real, dt: Real, out: &mut Vec<Actuation>) {
    for constraint in pair.both() {
        out.push(Actuation::Target { constraint, angle, dt });
    }
}

pub fn plan(input: &InputState, rig: &VehicleRig, tuning: &ControlTuning) -> Vec<Actuation> {
    let mut out = Vec::new();
    match &rig.motors {
        Motors::Mecanum { steer, .. } => {
            let angle = steer_sign(input) * tuning.mecanum_steer_target;
            target_pair(steer, angle, tuning.mecanum_steer_dt, &mut out);
        }
        // rear motors run at their build-time setting
        Motors::Simple { .. } => {}
        Motors::Steered { steering, drive } => {
            // left turns the front axle positive about +Y
            let angle = -steer_sign(input) * tuning.steered_steer_target;
            out.push(Actuation::Target {
                constraint: *steering,
                angle,
                dt: tuning.steered_steer_dt,
            });

            let (target, max_impulse) = if input.forward {
                (tuning.steered_speed, tuning.steered_drive_max_impulse)
            } else if input.back {
                (-tuning.steered_speed, tuning.steered_drive_max_impulse)
            } else {
                (0.0, tuning.steered_coast_max_impulse)
            };
            for constraint in drive.both() {
                out.push(Actuation::Velocity {
                    constraint,
                    enabled: true,
                    target,
                    max_impulse,
                });
            }

            if input.boost {
                out.push(Actuation::Impulse {
                    body: rig.chassis,
                    axis: Vector::y(),
                    magnitude: tuning.boost_impulse,
                });
            }
        }
    }
    out
}

pub fn apply<B: PhysicsBackend>(backend: &mut B, actuations: &[Actuation]) -> Result<(), RigError> {
    for actuation in actuations {
        match *actuation {
            Actuation::Velocity { constraint, enabled, target, max_impulse } => {
                backend.set_motor(constraint, enabled, target, max_impulse)?
            }
            Actuation::Target { constraint, angle, dt } => backend.set_motor_target(constraint, angle, dt)?,
            Actuation::Impulse { body, axis, magnitude } => backend.apply_impulse(body, axis, magnitude)?,
        }
    }
    Ok(())
}

/// One control tick: plan from the held keys and push it to the engine.
pub fn run_tick<B: PhysicsBackend>(
    backend: &mut B,
    rig: &VehicleRig,
    input: &InputState,
    tuning: &ControlTuning,
) -> Result<(), RigError> {
    let actuations = plan(input, rig, tuning);
    trace!(?input, count = actuations.len(), "control tick");
    apply(backend, &actuations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn steered_rig() -> VehicleRig {
        VehicleRig {
            variant: Variant::Steered,
            chassis: BodyHandle(0),
            bodies: Vec::new(),
            constraints: Vec::new(),
            motors: Motors::Steered {
                steering: ConstraintHandle(2),
                drive: MotorPair { right: ConstraintHandle(5), left: ConstraintHandle(6) },
            },
        }
    }

    fn mecanum_rig() -> VehicleRig {
        VehicleRig {
            variant: Variant::Mecanum,
            chassis: BodyHandle(12),
            bodies: Vec::new(),
            constraints: Vec::new(),
            motors: Motors::Mecanum {
                drive: MotorPair { right: ConstraintHandle(0), left: ConstraintHandle(1) },
                steer: MotorPair { right: ConstraintHandle(8), left: ConstraintHandle(9) },
            },
        }
    }

    #[test]
    fn mecanum_steers_yoke_pair() {
        let rig = mecanum_rig();
        let tuning = ControlTuning::default();

        let left = plan(&InputState { left: true, ..Default::default() }, &rig, &tuning);
        assert_eq!(
            left,
            vec![
                Actuation::Target { constraint: ConstraintHandle(9), angle: -0.3, dt: 0.5 },
                Actuation::Target { constraint: ConstraintHandle(8), angle: -0.3, dt: 0.5 },
            ]
        );

        let right = plan(&InputState { right: true, ..Default::default() }, &rig, &tuning);
        assert!(right.iter().all(|a| matches!(a, Actuation::Target { angle, .. } if *angle == 0.3)));

        let idle = plan(&InputState::default(), &rig, &tuning);
        assert!(idle.iter().all(|a| matches!(a, Actuation::Target { angle, .. } if *angle == 0.0)));
    }

    #[test]
    fn mecanum_ignores_throttle() {
        let rig = mecanum_rig();
        let tuning = ControlTuning::default();
        let idle = plan(&InputState::default(), &rig, &tuning);
        let throttle = plan(&InputState { forward: true, back: true, boost: true, ..Default::default() }, &rig, &tuning);
        assert_eq!(idle, throttle);
    }

    #[test]
    fn simple_rig_has_no_tick_commands() {
        let rig = VehicleRig {
            motors: Motors::Simple { drive: MotorPair { right: ConstraintHandle(0), left: ConstraintHandle(1) } },
            ..steered_rig()
        };
        let all = InputState { forward: true, left: true, back: true, right: true, boost: true };
        assert!(plan(&all, &rig, &ControlTuning::default()).is_empty());
    }

    #[test]
    fn steered_forward_and_left_compose() {
        let rig = steered_rig();
        let tuning = ControlTuning::default();
        let actions = plan(&InputState { forward: true, left: true, ..Default::default() }, &rig, &tuning);

        assert_eq!(
            actions,
            vec![
                Actuation::Target { constraint: ConstraintHandle(2), angle: 0.4, dt: tuning.steered_steer_dt },
                Actuation::Velocity { constraint: ConstraintHandle(6), enabled: true, target: 50.0, max_impulse: 5.0 },
                Actuation::Velocity { constraint: ConstraintHandle(5), enabled: true, target: 50.0, max_impulse: 5.0 },
            ]
        );
    }

    #[test]
    fn steered_release_coasts_and_centres() {
        let rig = steered_rig();
        let tuning = ControlTuning::default();
        let actions = plan(&InputState::default(), &rig, &tuning);

        for action in actions {
            match action {
                Actuation::Target { angle, .. } => assert_eq!(angle, 0.0),
                Actuation::Velocity { target, max_impulse, enabled, .. } => {
                    assert!(enabled);
                    assert_eq!(target, 0.0);
                    assert_eq!(max_impulse, 0.2);
                }
                Actuation::Impulse { .. } => panic!("no boost without space"),
            }
        }
    }

    #[test]
    fn back_reverses_and_boost_lifts() {
        let rig = steered_rig();
        let tuning = ControlTuning::default();
        let actions = plan(&InputState { back: true, boost: true, right: true, ..Default::default() }, &rig, &tuning);

        assert!(actions.contains(&Actuation::Target { constraint: ConstraintHandle(2), angle: -0.4, dt: 0.1 }));
        assert!(actions.contains(&Actuation::Velocity {
            constraint: ConstraintHandle(5),
            enabled: true,
            target: -50.0,
            max_impulse: 5.0,
        }));
        assert_eq!(
            actions.last(),
            Some(&Actuation::Impulse { body: BodyHandle(0), axis: Vector::y(), magnitude: 20.0 })
        );
    }

    #[test]
    fn plan_never_clamps() {
        let rig = steered_rig();
        let tuning = ControlTuning { steered_steer_target: 0.8, ..ControlTuning::default() };
        let actions = plan(&InputState { left: true, ..Default::default() }, &rig, &tuning);
        assert_eq!(actions[0], Actuation::Target { constraint: ConstraintHandle(2), angle: 0.8, dt: 0.1 });
    }
}
