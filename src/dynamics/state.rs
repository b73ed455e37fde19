extern crate nalgebra as na;

use na::{DVector, Isometry3};

use crate::{
    model_elements::model::Model,
    spatial::{SpatialAcc, Twist, Wrench},
};

/// The position of a free floating model: the pose of the base and the joint displacements.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeFloatingPos {
    /// The transform from the base link to the world.
    pub world_h_base: Isometry3<f64>,

    /// The joint displacements, one per degree of freedom.
    pub joint_positions: DVector<f64>,
}

impl FreeFloatingPos {
    /// Creates a zero position sized for the model.
    pub fn new(model: &Model) -> Self {
        Self {
            world_h_base: Isometry3::identity(),
            joint_positions: DVector::zeros(model.nr_of_dofs()),
        }
    }
}

/// The velocity of a free floating model.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeFloatingVel {
    /// The twist of the base link, expressed in the base link frame.
    pub base_twist: Twist,

    /// The joint velocities, one per degree of freedom.
    pub joint_velocities: DVector<f64>,
}

impl FreeFloatingVel {
    /// Creates a zero velocity sized for the model.
    pub fn new(model: &Model) -> Self {
        Self {
            base_twist: Twist::zeros(),
            joint_velocities: DVector::zeros(model.nr_of_dofs()),
        }
    }
}

/// The acceleration of a free floating model.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeFloatingAcc {
    /// The proper acceleration of the base link, expressed in the base link frame. The proper
    /// acceleration includes the effect of gravity, i.e. a base at rest in a gravity field `g` has
    /// the proper acceleration `[-g; 0]`.
    pub base_proper_acceleration: SpatialAcc,

    /// The joint accelerations, one per degree of freedom.
    pub joint_accelerations: DVector<f64>,
}

impl FreeFloatingAcc {
    /// Creates a zero acceleration sized for the model.
    pub fn new(model: &Model) -> Self {
        Self {
            base_proper_acceleration: SpatialAcc::zeros(),
            joint_accelerations: DVector::zeros(model.nr_of_dofs()),
        }
    }
}

/// The kinematic state of every link of a model. All buffers are indexed by link index.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkKinematics {
    /// The transform from each link to the world.
    pub world_h_link: Vec<Isometry3<f64>>,

    /// The twist of each link, expressed in the link frame.
    pub twists: Vec<Twist>,

    /// The proper acceleration of each link, expressed in the link frame.
    pub proper_accelerations: Vec<SpatialAcc>,
}

/// The result of an inverse dynamics computation.
#[derive(Clone, Debug, PartialEq)]
pub struct InverseDynamics {
    /// Per link index the wrench that the traversal parent applies on the link through their
    /// joint, expressed in the link frame. The entry of the base link is zero.
    pub internal_wrenches: Vec<Wrench>,

    /// The joint torques, one per degree of freedom.
    pub joint_torques: DVector<f64>,

    /// The wrench, expressed in the base link frame, that has to be added to the external wrench of
    /// the base link to make the external wrenches consistent with the motion of the model.
    pub base_wrench: Wrench,
}
