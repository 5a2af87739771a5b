use rapier3d_f64::prelude::*;
use tracing::debug;

use crate::backend::{
    AxisLimits, BodyDesc, BodyHandle, ConstraintDesc, ConstraintHandle, ConstraintKind, ConstraintType,
    GroundDesc, HingeLimits, MotorDrive, MotorState, PhysicsBackend, Shape,
};
use crate::error::RigError;

/// Vehicle parts overlap each other, so they only collide with the world.
const VEHICLE_GROUP: Group = Group::GROUP_1;

const GROUND_HALF_HEIGHT: Real = 0.1;

/// Damping factor of velocity motors (acceleration-based motor model).
const MOTOR_VELOCITY_FACTOR: Real = 1.0e2;

const LIN_AXES: [JointAxis; 3] = [JointAxis::LinX, JointAxis::LinY, JointAxis::LinZ];
const ANG_AXES: [JointAxis; 3] = [JointAxis::AngX, JointAxis::AngY, JointAxis::AngZ];

struct BodyEntry {
    name: String,
    handle: RigidBodyHandle,
}

struct ConstraintEntry {
    name: String,
    ty: ConstraintType,
    joint: ImpulseJointHandle,
    motor: Option<MotorState>,
    limits: Option<HingeLimits>,
}

/// [`PhysicsBackend`] over a rapier world stepped at a fixed `dt`.
pub struct RapierBackend {
    physics_pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    body_table: Vec<BodyEntry>,
    constraint_table: Vec<ConstraintEntry>,
}

impl RapierBackend {
    pub fn new(dt: Real, gravity: Vector<Real>) -> Self {
        let integration_parameters = IntegrationParameters {
            dt,
            min_ccd_dt: dt / 100.0,
            ..IntegrationParameters::default()
        };

        RapierBackend {
            physics_pipeline: PhysicsPipeline::new(),
            gravity,
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            body_table: Vec::new(),
            constraint_table: Vec::new(),
        }
    }

    pub fn dt(&self) -> Real {
        self.integration_parameters.dt
    }

    pub fn body_name(&self, body: BodyHandle) -> Option<&str> {
        self.body_table.get(body.0 as usize).map(|entry| entry.name.as_str())
    }

    pub fn constraint_name(&self, constraint: ConstraintHandle) -> Option<&str> {
        self.constraint_table.get(constraint.0 as usize).map(|entry| entry.name.as_str())
    }

    pub fn constraint_type(&self, constraint: ConstraintHandle) -> Option<ConstraintType> {
        self.constraint_table.get(constraint.0 as usize).map(|entry| entry.ty)
    }

    pub fn linvel(&self, body: BodyHandle) -> Option<Vector<Real>> {
        let handle = self.rigid_body(body)?;
        self.bodies.get(handle).map(|rb| *rb.linvel())
    }

    /// Angle of a hinge about its free axis, measured the way its motor
    /// measures it. Zero in the pose the hinge was created in.
    pub fn hinge_angle(&self, constraint: ConstraintHandle) -> Option<Real> {
        let entry = self.constraint_table.get(constraint.0 as usize)?;
        if entry.ty != ConstraintType::Hinge {
            return None;
        }
        let joint = self.impulse_joints.get(entry.joint)?;
        let frame1 = self.bodies.get(joint.body1)?.position() * joint.data.local_frame1;
        let frame2 = self.bodies.get(joint.body2)?.position() * joint.data.local_frame2;
        Some((frame1.rotation.inverse() * frame2.rotation).scaled_axis().x)
    }

    fn rigid_body(&self, body: BodyHandle) -> Option<RigidBodyHandle> {
        self.body_table.get(body.0 as usize).map(|entry| entry.handle)
    }

    fn register_body(&mut self, name: &str, handle: RigidBodyHandle) -> BodyHandle {
        let id = BodyHandle(self.body_table.len() as u32);
        self.body_table.push(BodyEntry { name: name.to_owned(), handle });
        id
    }

    fn hinge_entry(&mut self, constraint: ConstraintHandle) -> Result<&mut ConstraintEntry, RigError> {
        let entry = self
            .constraint_table
            .get_mut(constraint.0 as usize)
            .ok_or(RigError::UnknownConstraint(constraint))?;
        if entry.ty != ConstraintType::Hinge {
            return Err(RigError::NotMotorized(constraint));
        }
        Ok(entry)
    }

    fn joint_data(&mut self, joint: ImpulseJointHandle, constraint: ConstraintHandle) -> Result<&mut GenericJoint, RigError> {
        self.impulse_joints
            .get_mut(joint)
            .map(|joint| &mut joint.data)
            .ok_or(RigError::UnknownConstraint(constraint))
    }

    fn build_joint(&self, desc: &ConstraintDesc, pose1: &Isometry<Real>, pose2: &Isometry<Real>) -> (GenericJoint, Option<MotorState>, Option<HingeLimits>) {
        match &desc.kind {
            ConstraintKind::Hinge { pivot_a, pivot_b, axis_a, limits, motor, .. } => {
                let mut joint: GenericJoint = RevoluteJointBuilder::new(UnitVector::new_normalize(*axis_a))
                    .local_anchor1(*pivot_a)
                    .build()
                    .into();
                // angle 0 is the relative pose at creation
                let mut frame2 = pose2.inv_mul(&(pose1 * joint.local_frame1));
                frame2.translation.vector = pivot_b.coords;
                joint.local_frame2 = frame2;

                if let Some(limits) = limits {
                    joint.set_limits(JointAxis::AngX, [limits.lower, limits.upper]);
                }

                let motor = motor.map(|motor| {
                    write_velocity_motor(&mut joint, self.dt(), motor.enabled, motor.target_velocity, motor.max_impulse);
                    MotorState {
                        enabled: motor.enabled,
                        max_impulse: motor.max_impulse,
                        drive: MotorDrive::Velocity(motor.target_velocity),
                    }
                });

                (joint, motor, *limits)
            }
            ConstraintKind::Lock => {
                let joint = FixedJointBuilder::new()
                    .local_frame1(pose1.inv_mul(pose2))
                    .local_frame2(Isometry::identity())
                    .build()
                    .into();
                (joint, None, None)
            }
            ConstraintKind::Spring { linear, angular, stiffness, damping, angular_lock, offset } => {
                let mut joint = six_dof(pose1, pose2, linear, angular, *angular_lock, offset);
                for (i, axis) in LIN_AXES.into_iter().enumerate() {
                    if !linear.is_locked(i) {
                        joint.set_motor_position(axis, 0.0, *stiffness, *damping);
                    }
                }
                (joint, None, None)
            }
            ConstraintKind::Dof { linear, angular, offset } => {
                (six_dof(pose1, pose2, linear, angular, false, offset), None, None)
            }
            ConstraintKind::Slider { axis, lower, upper } => {
                let mut joint: GenericJoint = PrismaticJointBuilder::new(UnitVector::new_normalize(*axis))
                    .limits([*lower, *upper])
                    .build()
                    .into();
                joint.local_frame2 = pose2.inv_mul(&(pose1 * joint.local_frame1));
                (joint, None, None)
            }
        }
    }
}

/// Generic joint anchored at `offset` in body 1 and at rest in the current
/// relative pose. Axes with equal limits are locked, the rest are limited.
fn six_dof(
    pose1: &Isometry<Real>,
    pose2: &Isometry<Real>,
    linear: &AxisLimits,
    angular: &AxisLimits,
    angular_lock: bool,
    offset: &Vector<Real>,
) -> GenericJoint {
    let mut locked = JointAxesMask::empty();
    for i in 0..3 {
        if linear.is_locked(i) {
            locked |= JointAxesMask::from(LIN_AXES[i]);
        }
        if angular_lock || angular.is_locked(i) {
            locked |= JointAxesMask::from(ANG_AXES[i]);
        }
    }

    let frame1 = Isometry::translation(offset.x, offset.y, offset.z);
    let frame2 = pose2.inv_mul(&(pose1 * frame1));
    let mut joint = GenericJointBuilder::new(locked)
        .local_frame1(frame1)
        .local_frame2(frame2)
        .build();

    for i in 0..3 {
        if !linear.is_locked(i) {
            joint.set_limits(LIN_AXES[i], [linear.lower[i], linear.upper[i]]);
        }
        if !angular_lock && !angular.is_locked(i) {
            joint.set_limits(ANG_AXES[i], [angular.lower[i], angular.upper[i]]);
        }
    }

    joint
}

/// A disabled motor keeps its target but may not push.
fn write_velocity_motor(joint: &mut GenericJoint, dt: Real, enabled: bool, target_velocity: Real, max_impulse: Real) {
    let max_force = if enabled { max_impulse / dt } else { 0.0 };
    joint
        .set_motor_velocity(JointAxis::AngX, target_velocity, MOTOR_VELOCITY_FACTOR)
        .set_motor_max_force(JointAxis::AngX, max_force);
}

impl PhysicsBackend for RapierBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, RigError> {
        desc.validate()?;

        let rigid_body = if desc.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic().can_sleep(false)
        };
        let rigid_body_handle = self.bodies.insert(rigid_body.position(desc.pose));

        let mut collider = match desc.shape {
            Shape::Cuboid { width, height, depth } => ColliderBuilder::cuboid(width / 2.0, height / 2.0, depth / 2.0),
            Shape::Cylinder { radius, height } => ColliderBuilder::cylinder(height / 2.0, radius),
        }
        .collision_groups(InteractionGroups::new(VEHICLE_GROUP, !VEHICLE_GROUP));
        if !desc.is_static() {
            collider = collider.mass(desc.mass);
        }
        if let Some(friction) = desc.friction {
            collider = collider.friction(friction);
        }
        self.colliders.insert_with_parent(collider, rigid_body_handle, &mut self.bodies);

        Ok(self.register_body(&desc.name, rigid_body_handle))
    }

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> Result<ConstraintHandle, RigError> {
        desc.validate()?;

        let missing = |body| RigError::MissingDependency { constraint: desc.name.clone(), body };
        let rb1 = self.rigid_body(desc.body_a).ok_or_else(|| missing(desc.body_a))?;
        let rb2 = self.rigid_body(desc.body_b).ok_or_else(|| missing(desc.body_b))?;
        let pose1 = *self.bodies[rb1].position();
        let pose2 = *self.bodies[rb2].position();

        let (joint, motor, limits) = self.build_joint(desc, &pose1, &pose2);
        let joint_handle = self.impulse_joints.insert(rb1, rb2, joint, true);

        let id = ConstraintHandle(self.constraint_table.len() as u32);
        self.constraint_table.push(ConstraintEntry {
            name: desc.name.clone(),
            ty: desc.kind.ty(),
            joint: joint_handle,
            motor,
            limits,
        });
        Ok(id)
    }

    fn set_motor(
        &mut self,
        constraint: ConstraintHandle,
        enabled: bool,
        target_velocity: Real,
        max_impulse: Real,
    ) -> Result<(), RigError> {
        let dt = self.dt();
        let entry = self.hinge_entry(constraint)?;
        entry.motor = Some(MotorState {
            enabled,
            max_impulse,
            drive: MotorDrive::Velocity(target_velocity),
        });
        let joint = entry.joint;

        write_velocity_motor(self.joint_data(joint, constraint)?, dt, enabled, target_velocity, max_impulse);
        Ok(())
    }

    fn set_motor_target(&mut self, constraint: ConstraintHandle, target_angle: Real, dt: Real) -> Result<(), RigError> {
        if !(dt > 0.0) {
            return Err(RigError::construction(format!("motor target on {}", constraint), "dt must be > 0"));
        }
        let entry = self.hinge_entry(constraint)?;
        // never configured: the engine's force bound is unlimited
        let previous = entry.motor.unwrap_or(MotorState {
            enabled: true,
            max_impulse: Real::INFINITY,
            drive: MotorDrive::Velocity(0.0),
        });
        entry.motor = Some(MotorState {
            enabled: previous.enabled,
            max_impulse: previous.max_impulse,
            drive: MotorDrive::Position { angle: target_angle, dt },
        });
        let joint = entry.joint;

        // critically damped with time constant dt
        self.joint_data(joint, constraint)?
            .set_motor_position(JointAxis::AngX, target_angle, 1.0 / (dt * dt), 2.0 / dt);
        Ok(())
    }

    fn set_constraint_limits(&mut self, constraint: ConstraintHandle, limits: HingeLimits) -> Result<(), RigError> {
        if !(limits.lower <= limits.upper) {
            return Err(RigError::construction(format!("limits on {}", constraint), "lower limit above upper"));
        }
        let entry = self.hinge_entry(constraint)?;
        entry.limits = Some(limits);
        let joint = entry.joint;

        self.joint_data(joint, constraint)?
            .set_limits(JointAxis::AngX, [limits.lower, limits.upper]);
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, axis: Vector<Real>, magnitude: Real) -> Result<(), RigError> {
        let direction = axis
            .try_normalize(1.0e-12)
            .ok_or_else(|| RigError::construction(format!("impulse on {}", body), "axis must be non-zero"))?;
        let handle = self.rigid_body(body).ok_or(RigError::UnknownBody(body))?;
        let rigid_body = self.bodies.get_mut(handle).ok_or(RigError::UnknownBody(body))?;
        rigid_body.apply_impulse(direction * magnitude, true);
        Ok(())
    }

    fn create_ground_plane(&mut self, desc: &GroundDesc) -> Result<BodyHandle, RigError> {
        if !(desc.width > 0.0 && desc.depth > 0.0 && desc.width.is_finite() && desc.depth.is_finite()) {
            return Err(RigError::construction("ground plane", "dimensions must be finite and > 0"));
        }

        let rigid_body = RigidBodyBuilder::fixed().translation(vector![0.0, desc.y - GROUND_HALF_HEIGHT, 0.0]);
        let floor_handle = self.bodies.insert(rigid_body);
        let collider = ColliderBuilder::cuboid(desc.width / 2.0, GROUND_HALF_HEIGHT, desc.depth / 2.0)
            .friction(desc.friction);
        self.colliders.insert_with_parent(collider, floor_handle, &mut self.bodies);

        debug!(width = desc.width, depth = desc.depth, "ground plane registered");
        Ok(self.register_body("ground", floor_handle))
    }

    fn step(&mut self) {
        let physics_hooks = ();
        let event_handler = ();

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &physics_hooks,
            &event_handler,
        );
    }

    fn body_pose(&self, body: BodyHandle) -> Option<Isometry<Real>> {
        let handle = self.rigid_body(body)?;
        self.bodies.get(handle).map(|rb| *rb.position())
    }

    fn motor_state(&self, constraint: ConstraintHandle) -> Option<MotorState> {
        self.constraint_table.get(constraint.0 as usize)?.motor
    }

    fn constraint_limits(&self, constraint: ConstraintHandle) -> Option<HingeLimits> {
        self.constraint_table.get(constraint.0 as usize)?.limits
    }

    fn body_count(&self) -> usize {
        self.body_table.len()
    }

    fn constraint_count(&self) -> usize {
        self.constraint_table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> RapierBackend {
        RapierBackend::new(1.0 / 60.0, vector![0.0, -9.81, 0.0])
    }

    fn pair(backend: &mut RapierBackend) -> (BodyHandle, BodyHandle) {
        let a = backend
            .create_body(&BodyDesc::cuboid("a", 1.0, 1.0, 1.0, 5.0).at(0.0, 2.0, 0.0))
            .unwrap();
        let b = backend
            .create_body(&BodyDesc::cylinder("b", 0.5, 0.3, 5.0).sideways().at(1.0, 2.0, 0.0))
            .unwrap();
        (a, b)
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let mut backend = world();
        let (a, _) = pair(&mut backend);
        let ghost = BodyHandle(42);

        let err = backend
            .create_constraint(&ConstraintDesc::new("ghost", a, ghost, ConstraintKind::Lock))
            .unwrap_err();
        assert_eq!(err, RigError::MissingDependency { constraint: "ghost".into(), body: ghost });
        assert_eq!(backend.constraint_count(), 0);
    }

    #[test]
    fn lock_holds_relative_pose() {
        let mut backend = world();
        let (a, b) = pair(&mut backend);
        backend.create_constraint(&ConstraintDesc::new("weld", a, b, ConstraintKind::Lock)).unwrap();

        let before = backend.body_pose(a).unwrap().inv_mul(&backend.body_pose(b).unwrap());
        for _ in 0..30 {
            backend.step();
        }
        let after = backend.body_pose(a).unwrap().inv_mul(&backend.body_pose(b).unwrap());

        assert!((before.translation.vector - after.translation.vector).norm() < 1.0e-2);
        assert!(backend.body_pose(a).unwrap().translation.y < 2.0, "welded pair should fall");
    }

    #[test]
    fn motor_commands_only_reach_hinges() {
        let mut backend = world();
        let (a, b) = pair(&mut backend);
        let lock = backend.create_constraint(&ConstraintDesc::new("weld", a, b, ConstraintKind::Lock)).unwrap();
        assert_eq!(backend.set_motor(lock, true, 1.0, 1.0), Err(RigError::NotMotorized(lock)));
        assert_eq!(
            backend.set_motor(ConstraintHandle(9), true, 1.0, 1.0),
            Err(RigError::UnknownConstraint(ConstraintHandle(9)))
        );

        let hinge = backend
            .create_constraint(&ConstraintDesc::new("spin", a, b, ConstraintKind::hinge(Vector::x(), Vector::x())))
            .unwrap();
        assert_eq!(backend.motor_state(hinge), None);

        backend.set_motor(hinge, true, -10.0, 0.05).unwrap();
        let state = backend.motor_state(hinge).unwrap();
        assert!(state.enabled);
        assert_eq!(state.target_velocity(), Some(-10.0));
        assert_eq!(state.max_impulse, 0.05);

        backend.set_motor_target(hinge, 0.3, 0.5).unwrap();
        let state = backend.motor_state(hinge).unwrap();
        assert_eq!(state.target_angle(), Some(0.3));
        assert_eq!(state.max_impulse, 0.05, "position mode keeps the impulse bound");
    }

    #[test]
    fn position_mode_keeps_enable_flag_and_bound() {
        let mut backend = world();
        let (a, b) = pair(&mut backend);
        let hinge = backend
            .create_constraint(&ConstraintDesc::new("spin", a, b, ConstraintKind::hinge(Vector::x(), Vector::x())))
            .unwrap();

        backend.set_motor_target(hinge, 0.2, 0.5).unwrap();
        let state = backend.motor_state(hinge).unwrap();
        assert!(state.enabled);
        assert_eq!(state.max_impulse, Real::INFINITY);

        backend.set_motor(hinge, false, 0.0, 3.0).unwrap();
        backend.set_motor_target(hinge, 0.2, 0.5).unwrap();
        let state = backend.motor_state(hinge).unwrap();
        assert!(!state.enabled, "a disabled motor stays disabled");
        assert_eq!(state.max_impulse, 3.0);
        assert_eq!(state.target_angle(), Some(0.2));
    }

    #[test]
    fn hinge_between_rotated_bodies_starts_at_zero() {
        let mut backend = RapierBackend::new(1.0 / 60.0, Vector::zeros());
        let chassis = backend
            .create_body(&BodyDesc::cuboid("chassis", 2.0, 0.4, 4.0, 40.0).at(0.0, 1.5, 0.0))
            .unwrap();
        let axle = backend
            .create_body(&BodyDesc::cylinder("axle", 0.1, 2.0, 10.0).sideways().at(0.0, 1.0, -1.7))
            .unwrap();
        let pose_a = backend.body_pose(chassis).unwrap();
        let pose_b = backend.body_pose(axle).unwrap();
        let pivot = point![0.0, 1.0, -1.7];
        let kind = ConstraintKind::Hinge {
            pivot_a: pose_a.inverse_transform_point(&pivot),
            pivot_b: pose_b.inverse_transform_point(&pivot),
            axis_a: Vector::y(),
            axis_b: pose_b.inverse_transform_vector(&Vector::y()),
            limits: Some(HingeLimits::symmetric(0.4)),
            motor: None,
        };
        let hinge = backend.create_constraint(&ConstraintDesc::new("steer", chassis, axle, kind)).unwrap();
        assert!(backend.hinge_angle(hinge).unwrap().abs() < 1.0e-9);

        backend.set_motor_target(hinge, 0.0, 0.1).unwrap();
        let before = pose_a.inv_mul(&pose_b);
        for _ in 0..120 {
            backend.step();
        }
        let after = backend.body_pose(chassis).unwrap().inv_mul(&backend.body_pose(axle).unwrap());
        assert!(backend.hinge_angle(hinge).unwrap().abs() < 1.0e-3);
        assert!(before.rotation.angle_to(&after.rotation) < 1.0e-3);

        backend.set_motor_target(hinge, 0.3, 0.1).unwrap();
        for _ in 0..120 {
            backend.step();
        }
        let angle = backend.hinge_angle(hinge).unwrap();
        assert!((angle - 0.3).abs() < 0.05, "hinge at {}", angle);
    }

    #[test]
    fn limits_are_stored_and_checked() {
        let mut backend = world();
        let (a, b) = pair(&mut backend);
        let hinge = backend
            .create_constraint(&ConstraintDesc::new("steer", a, b, ConstraintKind::hinge(Vector::y(), Vector::y())))
            .unwrap();

        backend.set_constraint_limits(hinge, HingeLimits::symmetric(0.4)).unwrap();
        assert_eq!(backend.constraint_limits(hinge), Some(HingeLimits::symmetric(0.4)));
        assert!(backend.set_constraint_limits(hinge, HingeLimits::new(1.0, -1.0)).is_err());
    }

    #[test]
    fn every_kind_registers() {
        let mut backend = world();
        let (a, b) = pair(&mut backend);
        let kinds = [
            ConstraintKind::Spring {
                linear: AxisLimits::symmetric(0.0, 0.2, 0.0),
                angular: AxisLimits::symmetric(0.0, std::f64::consts::PI, 0.0),
                stiffness: 50.0,
                damping: 5.0,
                angular_lock: false,
                offset: vector![0.5, 0.0, 0.0],
            },
            ConstraintKind::Dof {
                linear: AxisLimits::symmetric(0.02, 0.2, 0.02),
                angular: AxisLimits::locked(),
                offset: vector![0.0, 0.6, 0.0],
            },
            ConstraintKind::Slider { axis: Vector::z(), lower: -1.0, upper: 1.0 },
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            let ty = kind.ty();
            let handle = backend.create_constraint(&ConstraintDesc::new(format!("c{}", i), a, b, kind)).unwrap();
            assert_eq!(backend.constraint_type(handle), Some(ty));
        }
        for _ in 0..10 {
            backend.step();
        }
        assert_eq!(backend.constraint_count(), 3);
    }

    #[test]
    fn impulse_pushes_the_body() {
        let mut backend = RapierBackend::new(1.0 / 60.0, Vector::zeros());
        let (a, _) = pair(&mut backend);
        backend.step();
        backend.apply_impulse(a, Vector::y(), 5.0).unwrap();
        assert!(backend.linvel(a).unwrap().y > 0.0);
        assert!(backend.apply_impulse(a, Vector::zeros(), 5.0).is_err());
        assert_eq!(
            backend.apply_impulse(BodyHandle(99), Vector::y(), 1.0),
            Err(RigError::UnknownBody(BodyHandle(99)))
        );
    }

    #[test]
    fn ground_catches_falling_body() {
        let mut backend = world();
        let ground = GroundDesc { width: 200.0, depth: 200.0, y: 0.0, friction: 1.0 };
        let floor = backend.create_ground_plane(&ground).unwrap();
        assert_eq!(backend.body_name(floor), Some("ground"));

        let crate_body = backend
            .create_body(&BodyDesc::cuboid("crate", 1.0, 1.0, 1.0, 1.0).at(0.0, 2.0, 0.0))
            .unwrap();
        for _ in 0..240 {
            backend.step();
        }
        let y = backend.body_pose(crate_body).unwrap().translation.y;
        assert!(y > 0.3 && y < 0.7, "crate resting at {}", y);
    }
}
