extern crate nalgebra as na;

use na::DVector;

use crate::{
    model_elements::model::{DynamicTraversal, Model},
    spatial::{cross_motion, force_adjoint, motion_adjoint, net_wrench_without_gravity, Wrench},
    Error,
};

use super::{
    check_size, joint_value,
    state::{FreeFloatingAcc, FreeFloatingPos, FreeFloatingVel, InverseDynamics, LinkKinematics},
};

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod oracle_tests;

/// Computes physically consistent kinematic and dynamic states of a model.
pub trait DynamicsOracle {
    /// Computes the pose, twist and proper acceleration of every link.
    ///
    /// ## Parameters
    ///
    /// * 'model' - The model
    /// * 'traversal' - The traversal that defines the base and the parent of each link
    /// * 'pos' - The pose of the base and the joint displacements
    /// * 'vel' - The twist of the base and the joint velocities
    /// * 'acc' - The proper acceleration of the base and the joint accelerations
    ///
    /// ## Errors
    ///
    /// * [Error::SizeMismatch] - Returned when one of the buffers is not sized for the model.
    fn compute_link_kinematics(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        pos: &FreeFloatingPos,
        vel: &FreeFloatingVel,
        acc: &FreeFloatingAcc,
    ) -> Result<LinkKinematics, Error>;

    /// Computes the internal joint wrenches and torques that are consistent with the link
    /// kinematics and the external wrenches.
    ///
    /// The external wrench of the base link is in general not consistent with the motion. The
    /// difference is returned in [InverseDynamics::base_wrench].
    ///
    /// ## Parameters
    ///
    /// * 'model' - The model
    /// * 'traversal' - The traversal that defines the base and the parent of each link
    /// * 'joint_positions' - The joint displacements
    /// * 'kinematics' - The link kinematics, e.g. from [DynamicsOracle::compute_link_kinematics]
    /// * 'external_wrenches' - The net external wrench on each link, expressed in the link frame
    ///
    /// ## Errors
    ///
    /// * [Error::SizeMismatch] - Returned when one of the buffers is not sized for the model.
    fn compute_consistent_wrenches(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        joint_positions: &DVector<f64>,
        kinematics: &LinkKinematics,
        external_wrenches: &[Wrench],
    ) -> Result<InverseDynamics, Error>;
}

/// Computes the link kinematics with a forward recursion and the link wrenches with the backward
/// recursion of the recursive Newton-Euler algorithm.
///
/// ## References
///
/// * Rigid Body Dynamics Algorithms, Roy Featherstone, Springer, 2008, chapter 5
#[derive(Clone, Copy, Debug, Default)]
pub struct RecursiveNewtonEuler;

impl DynamicsOracle for RecursiveNewtonEuler {
    fn compute_link_kinematics(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        pos: &FreeFloatingPos,
        vel: &FreeFloatingVel,
        acc: &FreeFloatingAcc,
    ) -> Result<LinkKinematics, Error> {
        check_traversal(model, traversal)?;
        check_size("joint positions", model.nr_of_dofs(), pos.joint_positions.len())?;
        check_size("joint velocities", model.nr_of_dofs(), vel.joint_velocities.len())?;
        check_size(
            "joint accelerations",
            model.nr_of_dofs(),
            acc.joint_accelerations.len(),
        )?;

        let nr_of_links = model.nr_of_links();
        let mut result = LinkKinematics {
            world_h_link: vec![pos.world_h_base; nr_of_links],
            twists: vec![vel.base_twist; nr_of_links],
            proper_accelerations: vec![acc.base_proper_acceleration; nr_of_links],
        };

        for link in traversal.links().iter().skip(1) {
            let (parent, joint_index) =
                match (traversal.parent_link(*link), traversal.parent_joint(*link)) {
                    (Some(p), Some(j)) => (p, j),
                    _ => continue,
                };

            let joint = model.joint_unchecked(joint_index);
            let q = joint_value(joint, &pos.joint_positions);
            let dq = joint_value(joint, &vel.joint_velocities);
            let ddq = joint_value(joint, &acc.joint_accelerations);

            let link_h_parent = joint.transform_to(q, *link);
            let link_x_parent = motion_adjoint(&link_h_parent);
            let subspace = joint.motion_subspace(q, *link);

            let twist = link_x_parent * result.twists[parent.index()] + subspace * dq;
            let proper_acceleration = link_x_parent * result.proper_accelerations[parent.index()]
                + subspace * ddq
                + cross_motion(&twist) * (subspace * dq);

            result.world_h_link[link.index()] =
                result.world_h_link[parent.index()] * link_h_parent.inverse();
            result.twists[link.index()] = twist;
            result.proper_accelerations[link.index()] = proper_acceleration;
        }

        Ok(result)
    }

    fn compute_consistent_wrenches(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        joint_positions: &DVector<f64>,
        kinematics: &LinkKinematics,
        external_wrenches: &[Wrench],
    ) -> Result<InverseDynamics, Error> {
        check_traversal(model, traversal)?;
        check_size("joint positions", model.nr_of_dofs(), joint_positions.len())?;
        check_size("link twists", model.nr_of_links(), kinematics.twists.len())?;
        check_size(
            "link proper accelerations",
            model.nr_of_links(),
            kinematics.proper_accelerations.len(),
        )?;
        check_size(
            "external wrenches",
            model.nr_of_links(),
            external_wrenches.len(),
        )?;

        let mut link_wrenches = link_net_wrenches_without_gravity(model, kinematics)?;
        for (wrench, external) in link_wrenches.iter_mut().zip(external_wrenches) {
            *wrench -= external;
        }

        let mut joint_torques = DVector::zeros(model.nr_of_dofs());
        for link in traversal.links().iter().rev() {
            for child in traversal.children(*link) {
                let joint = match traversal.parent_joint(*child) {
                    Some(j) => model.joint_unchecked(j),
                    None => continue,
                };

                let q = joint_value(joint, joint_positions);
                let link_h_child = joint.transform_to(q, *link);
                let transmitted = force_adjoint(&link_h_child) * link_wrenches[child.index()];
                link_wrenches[link.index()] += transmitted;
            }

            if let Some(joint_index) = traversal.parent_joint(*link) {
                let joint = model.joint_unchecked(joint_index);
                if joint.nr_of_dofs() > 0 {
                    let q = joint_value(joint, joint_positions);
                    let subspace = joint.motion_subspace(q, *link);
                    joint_torques[joint.dof_offset()] = subspace.dot(&link_wrenches[link.index()]);
                }
            }
        }

        let base = traversal.base_link();
        let base_wrench = link_wrenches[base.index()];
        link_wrenches[base.index()] = Wrench::zeros();

        Ok(InverseDynamics {
            internal_wrenches: link_wrenches,
            joint_torques,
            base_wrench,
        })
    }
}

/// Returns, per link index, the net wrench `I a + v ×* (I v)` acting on each link, excluding the
/// gravitational wrench.
///
/// ## Errors
///
/// * [Error::SizeMismatch] - Returned when the kinematics are not sized for the model.
pub fn link_net_wrenches_without_gravity(
    model: &Model,
    kinematics: &LinkKinematics,
) -> Result<Vec<Wrench>, Error> {
    check_size("link twists", model.nr_of_links(), kinematics.twists.len())?;
    check_size(
        "link proper accelerations",
        model.nr_of_links(),
        kinematics.proper_accelerations.len(),
    )?;

    Ok(model
        .links()
        .iter()
        .zip(kinematics.proper_accelerations.iter())
        .zip(kinematics.twists.iter())
        .map(|((link, acc), twist)| net_wrench_without_gravity(link.spatial_inertia(), acc, twist))
        .collect())
}

fn check_traversal(model: &Model, traversal: &DynamicTraversal) -> Result<(), Error> {
    check_size(
        "traversal",
        model.nr_of_links(),
        traversal.nr_of_visited_links(),
    )
}
