extern crate nalgebra as na;

use na::{DVector, Isometry3, Vector3};

use crate::{
    dynamics::{check_size, joint_value},
    model_elements::{
        frame_elements::LinkIndex,
        model::{DynamicTraversal, Model},
    },
    spatial::{angular, from_parts, motion_adjoint, SpatialAcc, Twist},
    Error,
};

#[cfg(test)]
#[path = "kinematics_tests.rs"]
mod kinematics_tests;

/// The kinematic quantities that appear as coefficients in the BERDY matrices. All link buffers
/// are indexed by link index.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BerdyKinematics {
    pub joint_velocities: DVector<f64>,

    /// The transform from the traversal parent to each link. Identity for the base.
    pub link_h_parent: Vec<Isometry3<f64>>,

    /// The motion subspace of the parent joint of each link, in the link frame. Zero for the base
    /// and for fixed joints.
    pub motion_subspaces: Vec<Twist>,

    pub twists: Vec<Twist>,

    /// The known proper acceleration of the base. Only used by the fixed base formulation.
    pub base_proper_acceleration: SpatialAcc,
}

impl BerdyKinematics {
    /// Computes the kinematics for the given joint state and base twist.
    fn compute(
        model: &Model,
        traversal: &DynamicTraversal,
        joint_positions: &DVector<f64>,
        joint_velocities: &DVector<f64>,
        base_twist: Twist,
        base_proper_acceleration: SpatialAcc,
    ) -> Self {
        let nr_of_links = model.nr_of_links();
        let mut result = Self {
            joint_velocities: joint_velocities.clone(),
            link_h_parent: vec![Isometry3::identity(); nr_of_links],
            motion_subspaces: vec![Twist::zeros(); nr_of_links],
            twists: vec![base_twist; nr_of_links],
            base_proper_acceleration,
        };

        for link in traversal.links().iter().skip(1) {
            let (parent, joint_index) =
                match (traversal.parent_link(*link), traversal.parent_joint(*link)) {
                    (Some(p), Some(j)) => (p, j),
                    _ => continue,
                };

            let joint = model.joint_unchecked(joint_index);
            let q = joint_value(joint, joint_positions);
            let dq = joint_value(joint, joint_velocities);

            let link_h_parent = joint.transform_to(q, *link);
            let subspace = joint.motion_subspace(q, *link);

            result.twists[link.index()] =
                motion_adjoint(&link_h_parent) * result.twists[parent.index()] + subspace * dq;
            result.link_h_parent[link.index()] = link_h_parent;
            result.motion_subspaces[link.index()] = subspace;
        }

        result
    }

    /// Returns the transform from the given link to the traversal base.
    fn base_h_link(&self, traversal: &DynamicTraversal, link: LinkIndex) -> Isometry3<f64> {
        let mut result = Isometry3::identity();
        let mut current = link;
        while let Some(parent) = traversal.parent_link(current) {
            result = self.link_h_parent[current.index()].inverse() * result;
            current = parent;
        }

        result
    }

    /// Computes the kinematics of a model whose base is fixed in a gravity field.
    ///
    /// ## Parameters
    ///
    /// * 'gravity' - The gravity acceleration, expressed in the base frame
    pub fn from_fixed_base(
        model: &Model,
        traversal: &DynamicTraversal,
        joint_positions: &DVector<f64>,
        joint_velocities: &DVector<f64>,
        gravity: &Vector3<f64>,
    ) -> Result<Self, Error> {
        check_joint_buffers(model, joint_positions, joint_velocities)?;

        let base_proper_acceleration = from_parts(&(-gravity), &Vector3::zeros());
        Ok(Self::compute(
            model,
            traversal,
            joint_positions,
            joint_velocities,
            Twist::zeros(),
            base_proper_acceleration,
        ))
    }

    /// Computes the kinematics of a floating model, given the angular velocity of one of its
    /// links. The linear velocity of the base is assumed to be zero.
    ///
    /// ## Parameters
    ///
    /// * 'floating_frame' - The link whose angular velocity is known
    /// * 'angular_velocity' - The angular velocity of the floating frame, expressed in the
    ///   floating frame
    pub fn from_floating_base(
        model: &Model,
        traversal: &DynamicTraversal,
        joint_positions: &DVector<f64>,
        joint_velocities: &DVector<f64>,
        floating_frame: LinkIndex,
        angular_velocity: &Vector3<f64>,
    ) -> Result<Self, Error> {
        check_joint_buffers(model, joint_positions, joint_velocities)?;
        if !model.is_valid_link(floating_frame) {
            return Err(Error::InvalidLinkIndex {
                index: floating_frame,
            });
        }

        // The angular velocity of the floating frame is the rotated base angular velocity plus the
        // angular velocity relative to the base.
        let relative = Self::compute(
            model,
            traversal,
            joint_positions,
            joint_velocities,
            Twist::zeros(),
            SpatialAcc::zeros(),
        );
        let relative_angular_velocity = angular(&relative.twists[floating_frame.index()]);
        let base_h_frame = relative.base_h_link(traversal, floating_frame);
        let base_angular_velocity =
            base_h_frame.rotation * (angular_velocity - relative_angular_velocity);

        Ok(Self::compute(
            model,
            traversal,
            joint_positions,
            joint_velocities,
            from_parts(&Vector3::zeros(), &base_angular_velocity),
            SpatialAcc::zeros(),
        ))
    }

    /// Returns the kinematics of a model at rest in the zero configuration, without gravity.
    pub fn zero(model: &Model, traversal: &DynamicTraversal) -> Self {
        let nr_of_dofs = model.nr_of_dofs();
        Self::compute(
            model,
            traversal,
            &DVector::zeros(nr_of_dofs),
            &DVector::zeros(nr_of_dofs),
            Twist::zeros(),
            SpatialAcc::zeros(),
        )
    }
}

fn check_joint_buffers(
    model: &Model,
    joint_positions: &DVector<f64>,
    joint_velocities: &DVector<f64>,
) -> Result<(), Error> {
    check_size("joint positions", model.nr_of_dofs(), joint_positions.len())?;
    check_size("joint velocities", model.nr_of_dofs(), joint_velocities.len())
}
