//! Defines the different frame elements that are used to create a model, i.e. the rigid links
//! and the joints that connect them.

extern crate nalgebra as na;

use std::fmt::Display;

use na::{Isometry3, Matrix3, Matrix6, Translation3, Unit, UnitQuaternion, Vector3};

use crate::spatial::{from_parts, motion_adjoint, spatial_inertia, Twist};

#[cfg(test)]
#[path = "frame_elements_tests.rs"]
mod frame_elements_tests;

/// Defines the index of a [Link] in a model.
///
/// Links are stored densely, so the index can be used directly to address per link buffers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkIndex {
    index: usize,
}

impl LinkIndex {
    /// Returns the position of the link in the per link buffers.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creates a new LinkIndex.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Display for LinkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LinkIndex [{}]", self.index)
    }
}

impl From<usize> for LinkIndex {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// Defines the index of a [Joint] in a model.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointIndex {
    index: usize,
}

impl JointIndex {
    /// Returns the position of the joint in the per joint buffers.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creates a new JointIndex.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Display for JointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JointIndex [{}]", self.index)
    }
}

impl From<usize> for JointIndex {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// Defines a rigid link of a model, together with its inertial parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    /// The human readable name for the element.
    name: String,

    /// Defines the mass of the element in kg.
    mass_in_kg: f64,

    /// Stores the location of the center of mass of the element, relative to the
    /// elements coordinate frame.
    center_of_mass: Vector3<f64>,

    /// Stores the rotational inertia of the element about its center of mass, with the
    /// orientation of the elements coordinate frame.
    moment_of_inertia: Matrix3<f64>,

    /// The spatial inertia for the element, expressed in the elements coordinate frame.
    spatial_inertia: Matrix6<f64>,
}

impl Link {
    /// Returns the location of the center of mass of the element, relative to the
    /// elements coordinate frame.
    pub fn center_of_mass(&self) -> &Vector3<f64> {
        &self.center_of_mass
    }

    /// Returns the mass of the element in kg.
    pub fn mass_in_kg(&self) -> f64 {
        self.mass_in_kg
    }

    /// Returns the rotational inertia of the element about its center of mass.
    pub fn moment_of_inertia(&self) -> &Matrix3<f64> {
        &self.moment_of_inertia
    }

    /// Returns the name of the element.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Creates a new Link.
    ///
    /// ## Parameters
    ///
    /// * 'name' - The name of the element
    /// * 'mass' - The mass in kg of the element
    /// * 'center_of_mass' - The location of the center of mass for the element relative to the
    ///   elements own reference frame
    /// * 'moment_of_inertia' - The rotational inertia for the element about the center of mass,
    ///   with the orientation of the elements own reference frame.
    pub fn new(
        name: String,
        mass: f64,
        center_of_mass: Vector3<f64>,
        moment_of_inertia: Matrix3<f64>,
    ) -> Self {
        let spatial_inertia = spatial_inertia(mass, &center_of_mass, &moment_of_inertia);
        Self {
            name,
            mass_in_kg: mass,
            center_of_mass,
            moment_of_inertia,
            spatial_inertia,
        }
    }

    /// Returns the spatial inertia for this element, expressed in the element frame.
    pub fn spatial_inertia(&self) -> &Matrix6<f64> {
        &self.spatial_inertia
    }
}

/// Defines the degree-of-freedom of a joint.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JointDofType {
    /// The two links are rigidly connected.
    Fixed,
    /// The second link rotates around the joint axis, which passes through the origin of
    /// the second link.
    Revolute,
    /// The second link translates along the joint axis.
    Prismatic,
}

/// Defines a joint that connects two links.
///
/// The joint is described from the point of view of the `first_link`: at zero displacement
/// the transform from the second link to the first link is the rest transform. The joint axis
/// is expressed in the frame of the second link. Whether a link is the parent or the child of
/// the joint only depends on the traversal that is used to visit the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    /// The human readable name for the element.
    name: String,

    /// Defines the degree of freedom for the element. Is one of
    /// - Fixed
    /// - Rotational / Revolute around the axis
    /// - Translational / Prismatic along the axis
    degree_of_freedom_kind: JointDofType,

    /// The first link connected by the joint.
    first_link: LinkIndex,

    /// The second link connected by the joint.
    second_link: LinkIndex,

    /// The homogeneous transform from the second link to the first link at displacement = 0
    rest_transform: Isometry3<f64>,

    /// The axis of motion, expressed in the frame of the second link.
    axis: Unit<Vector3<f64>>,

    /// The offset of the degree of freedom of the joint in the joint position, velocity,
    /// acceleration and torque buffers. Assigned when the joint is added to a model.
    dof_offset: usize,
}

impl Joint {
    /// Returns the axis of motion, expressed in the frame of the second link.
    pub fn axis(&self) -> &Unit<Vector3<f64>> {
        &self.axis
    }

    /// Indicates what type of degree-of-freedom the joint has.
    pub fn degree_of_freedom_kind(&self) -> JointDofType {
        self.degree_of_freedom_kind
    }

    /// Returns the offset of the joint in the per DOF buffers. Only meaningful for joints
    /// that have a degree of freedom.
    pub fn dof_offset(&self) -> usize {
        self.dof_offset
    }

    /// Returns the first link connected by the joint.
    pub fn first_link(&self) -> LinkIndex {
        self.first_link
    }

    /// Returns a value indicating whether the joint connects the given link.
    pub fn is_attached_to(&self, link: LinkIndex) -> bool {
        self.first_link == link || self.second_link == link
    }

    /// Returns the name of the element.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Creates a new joint.
    ///
    /// ## Parameters
    ///
    /// * 'name' - The name of the joint
    /// * 'degree_of_freedom_kind' - The kind of motion that the joint allows
    /// * 'first_link' - The first link connected by the joint
    /// * 'second_link' - The second link connected by the joint
    /// * 'rest_transform' - The transform from the second link to the first link at zero
    ///   displacement
    /// * 'axis' - The axis of motion, expressed in the frame of the second link. Ignored for
    ///   fixed joints.
    pub fn new(
        name: String,
        degree_of_freedom_kind: JointDofType,
        first_link: LinkIndex,
        second_link: LinkIndex,
        rest_transform: Isometry3<f64>,
        axis: Unit<Vector3<f64>>,
    ) -> Self {
        Self {
            name,
            degree_of_freedom_kind,
            first_link,
            second_link,
            rest_transform,
            axis,
            dof_offset: 0,
        }
    }

    /// Creates a new joint that rigidly connects two links.
    pub fn new_fixed(
        name: String,
        first_link: LinkIndex,
        second_link: LinkIndex,
        rest_transform: Isometry3<f64>,
    ) -> Self {
        Self::new(
            name,
            JointDofType::Fixed,
            first_link,
            second_link,
            rest_transform,
            Vector3::z_axis(),
        )
    }

    /// Returns the number of degrees of freedom of the joint, either 0 or 1.
    pub fn nr_of_dofs(&self) -> usize {
        match self.degree_of_freedom_kind {
            JointDofType::Fixed => 0,
            JointDofType::Revolute | JointDofType::Prismatic => 1,
        }
    }

    /// Returns the link on the other side of the joint, or `None` if the joint is not
    /// attached to the given link.
    pub fn other_link(&self, link: LinkIndex) -> Option<LinkIndex> {
        if link == self.first_link {
            Some(self.second_link)
        } else if link == self.second_link {
            Some(self.first_link)
        } else {
            None
        }
    }

    /// Returns the transform from the second link to the first link at zero displacement.
    pub fn rest_transform(&self) -> &Isometry3<f64> {
        &self.rest_transform
    }

    /// Returns the second link connected by the joint.
    pub fn second_link(&self) -> LinkIndex {
        self.second_link
    }

    pub(crate) fn set_dof_offset(&mut self, dof_offset: usize) {
        self.dof_offset = dof_offset;
    }

    /// Returns the motion subspace vector `S` of the joint: the twist of `child` relative to
    /// the other link for a unit joint velocity, expressed in the frame of `child`.
    ///
    /// `child` is assumed to be one of the links of the joint. Fixed joints return a zero
    /// vector.
    ///
    /// ## Parameters
    ///
    /// * 'position' - The joint displacement
    /// * 'child' - The link whose relative motion is described
    pub fn motion_subspace(&self, position: f64, child: LinkIndex) -> Twist {
        let second_subspace = match self.degree_of_freedom_kind {
            JointDofType::Fixed => return Twist::zeros(),
            JointDofType::Revolute => from_parts(&Vector3::zeros(), &self.axis),
            JointDofType::Prismatic => from_parts(&self.axis, &Vector3::zeros()),
        };

        if child == self.second_link {
            second_subspace
        } else {
            // The first link moves in the opposite direction relative to the second link.
            -(motion_adjoint(&self.transform_first_from_second(position)) * second_subspace)
        }
    }

    /// Returns the homogeneous transform `dst_H_other` that turns coordinates of the other link
    /// of the joint into coordinates of `dst`.
    ///
    /// `dst` is assumed to be one of the links of the joint.
    ///
    /// ## Parameters
    ///
    /// * 'position' - The joint displacement
    /// * 'dst' - The link in which the coordinates are expressed after the transform
    pub fn transform_to(&self, position: f64, dst: LinkIndex) -> Isometry3<f64> {
        let first_h_second = self.transform_first_from_second(position);
        if dst == self.first_link {
            first_h_second
        } else {
            first_h_second.inverse()
        }
    }

    fn transform_first_from_second(&self, position: f64) -> Isometry3<f64> {
        self.rest_transform * self.transform_for_motion(position)
    }

    fn transform_for_motion(&self, position: f64) -> Isometry3<f64> {
        match self.degree_of_freedom_kind {
            JointDofType::Fixed => Isometry3::identity(),
            JointDofType::Revolute => self.transform_for_revolute_motion(position),
            JointDofType::Prismatic => self.transform_for_prismatic_motion(position),
        }
    }

    fn transform_for_prismatic_motion(&self, distance_moved: f64) -> Isometry3<f64> {
        let translation = Translation3::from(self.axis.into_inner() * distance_moved);
        Isometry3::from_parts(translation, UnitQuaternion::identity())
    }

    fn transform_for_revolute_motion(&self, distance_rotated: f64) -> Isometry3<f64> {
        let rotation = UnitQuaternion::from_axis_angle(&self.axis, distance_rotated);
        Isometry3::from_parts(Translation3::identity(), rotation)
    }
}
