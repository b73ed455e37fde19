#![warn(missing_docs)]

//! Sparse BERDY (Bayesian Estimation of Robot Dynamics) problem assembly for articulated
//! rigid-body models.
//!
//! Provides the linear systems `D * d + bD = 0` (the Newton-Euler laws of motion written as
//! linear constraints on the dynamic variables `d`) and `Y * d + bY = y` (the sensor model)
//! for a kinematic tree and a set of sensors, together with the serialization of numeric
//! values into `d` and `y` using exactly the same variable ordering.

use thiserror::Error;

use berdy::variables::BerdyDynamicVariablesTypes;
use model_elements::frame_elements::{JointIndex, LinkIndex};

/// Defines spatial (6D) vector algebra helpers.
pub mod spatial;

/// Defines the links, joints and the kinematic tree of a model.
pub mod model_elements;

/// Provides the forward kinematics and Newton-Euler computations used to generate
/// physically consistent states.
pub mod dynamics;

/// Defines the sensors that can be attached to a model and the prediction of their measurements.
pub mod sensors;

/// Assembles and serializes the BERDY estimation problem.
pub mod berdy;

#[cfg(test)]
mod test_models;

/// Defines the different errors for the BERDY estimation crate.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The BERDY options are not consistent with the selected variant.
    #[error("Inconsistent BERDY options: {reason}")]
    InvalidOptions {
        /// The description of the inconsistency.
        reason: String,
    },

    /// The operation requires an initialized BERDY helper.
    #[error("The BERDY helper has not been initialized")]
    NotInitialized,

    /// A sensor references a model element that does not exist or that cannot be
    /// measured with the current options.
    #[error("Sensors are not consistent with the model: {reason}")]
    InconsistentSensorModel {
        /// The description of the inconsistency.
        reason: String,
    },

    /// A caller supplied buffer does not have the expected size.
    #[error("Size mismatch for {what}: expected {expected} but got {actual}")]
    SizeMismatch {
        /// The buffer that has the wrong size.
        what: String,
        /// The expected size.
        expected: usize,
        /// The actual size.
        actual: usize,
    },

    /// A link with the same name is already part of the model.
    #[error("A link with the name {name} already exists")]
    LinkAlreadyExists {
        /// The name of the link.
        name: String,
    },

    /// A joint with the same name is already part of the model.
    #[error("A joint with the name {name} already exists")]
    JointAlreadyExists {
        /// The name of the joint.
        name: String,
    },

    /// A sensor with the same name and type is already part of the sensor list.
    #[error("A sensor with the name {name} already exists")]
    SensorAlreadyExists {
        /// The name of the sensor.
        name: String,
    },

    /// There is no link with the given name.
    #[error("There is no link with the name {name}")]
    MissingLink {
        /// The name of the link.
        name: String,
    },

    /// There is no joint with the given name.
    #[error("There is no joint with the name {name}")]
    MissingJoint {
        /// The name of the joint.
        name: String,
    },

    /// The link index does not refer to a link of the model.
    #[error("The link index {index} is not valid")]
    InvalidLinkIndex {
        /// The invalid index.
        index: LinkIndex,
    },

    /// The joint index does not refer to a joint of the model.
    #[error("The joint index {index} is not valid")]
    InvalidJointIndex {
        /// The invalid index.
        index: JointIndex,
    },

    /// Adding the joint would close a kinematic loop.
    #[error("The joint {joint} would close a kinematic loop")]
    KinematicLoop {
        /// The name of the joint.
        joint: String,
    },

    /// Some links cannot be reached from the base link.
    #[error("The link {link} is not connected to the base link")]
    DisconnectedModel {
        /// The name of the first link that could not be reached.
        link: String,
    },

    /// The dynamic variables do not contain a variable with the given type and identifier.
    #[error("There is no dynamic variable of type {variable_type} for {id}")]
    MissingDynamicVariable {
        /// The type of the variable.
        variable_type: BerdyDynamicVariablesTypes,
        /// The name of the link or joint.
        id: String,
    },

    /// The fixed frame of a fixed base kinematics update is not the traversal base.
    #[error("The fixed frame {frame} is not the base link {base} of the traversal")]
    FixedFrameIsNotBase {
        /// The frame that was provided.
        frame: LinkIndex,
        /// The base link of the traversal.
        base: LinkIndex,
    },
}
