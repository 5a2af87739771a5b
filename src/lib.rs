//! Constraint-built vehicles on a rapier world.
//!
//! A rig is a fixed set of rigid bodies joined by hinges, locks, springs and
//! degrees-of-freedom joints. Each tick the control loop turns held keys into
//! motor targets on a handful of those joints; the physics engine does the
//! rest.

pub mod backend;
pub mod config;
pub mod control;
pub mod error;
pub mod ground;
pub mod input;
pub mod logging;
pub mod rapier;
pub mod rig;
pub mod scene;

#[cfg(feature = "python")]
mod python;

pub use backend::{BodyHandle, ConstraintHandle, PhysicsBackend};
pub use config::{SceneConfig, Variant};
pub use error::RigError;
pub use input::InputState;
pub use rapier::RapierBackend;
pub use rig::VehicleRig;
pub use scene::Scene;
