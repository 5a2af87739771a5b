use std::fmt;

use crate::backend::{BodyHandle, ConstraintHandle};

/// Failure while assembling or driving a rig.
///
/// Every variant is fatal for the scene it came from. Callers throw the
/// scene away and start over.
#[derive(Debug, Clone, PartialEq)]
pub enum RigError {
    /// The engine (or our own validation) rejected a body or constraint.
    Construction { what: String, reason: String },
    /// A constraint names a body that was never created.
    MissingDependency { constraint: String, body: BodyHandle },
    UnknownBody(BodyHandle),
    UnknownConstraint(ConstraintHandle),
    /// Motor command sent to a constraint kind that has no motor.
    NotMotorized(ConstraintHandle),
}

impl RigError {
    pub(crate) fn construction(what: impl Into<String>, reason: impl Into<String>) -> Self {
        RigError::Construction {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigError::Construction { what, reason } => {
                write!(f, "engine rejected {}: {}", what, reason)
            }
            RigError::MissingDependency { constraint, body } => {
                write!(f, "constraint {} references missing body {}", constraint, body)
            }
            RigError::UnknownBody(handle) => write!(f, "unknown body {}", handle),
            RigError::UnknownConstraint(handle) => write!(f, "unknown constraint {}", handle),
            RigError::NotMotorized(handle) => {
                write!(f, "constraint {} has no motor", handle)
            }
        }
    }
}

impl std::error::Error for RigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = RigError::MissingDependency {
            constraint: "wheel_back_left/rotor".into(),
            body: BodyHandle(7),
        };
        assert_eq!(
            err.to_string(),
            "constraint wheel_back_left/rotor references missing body BodyHandle(7)"
        );

        let err = RigError::construction("body plate", "mass must be > 0");
        assert_eq!(err.to_string(), "engine rejected body plate: mass must be > 0");
    }
}
