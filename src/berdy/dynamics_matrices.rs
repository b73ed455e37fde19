//! Assembly of the dynamics constraint system `D * d + bD = 0`.
//!
//! Each [BerdyVariant] is implemented by a strategy that defines both the dynamic variables and
//! the equations, so that the two always agree.

extern crate nalgebra as na;

use na::{DVector, Matrix6};
use nalgebra_sparse::CscMatrix;

use crate::{
    model_elements::{
        frame_elements::LinkIndex,
        model::{DynamicTraversal, Model},
    },
    spatial::{cross_force, cross_motion, force_adjoint, motion_adjoint, net_wrench_without_gravity},
};

use super::{
    kinematics::BerdyKinematics,
    options::{BerdyOptions, BerdyVariant},
    sparse::MatrixBuilder,
    variables::{BerdyDynamicVariablesTypes, DynamicVariablesLayout, IndexRange},
};

#[cfg(test)]
#[path = "dynamics_matrices_tests.rs"]
mod dynamics_matrices_tests;

type VarType = BerdyDynamicVariablesTypes;

/// The inputs shared by the assembly of the BERDY matrices.
pub(crate) struct AssemblyContext<'a> {
    pub model: &'a Model,
    pub traversal: &'a DynamicTraversal,
    pub options: &'a BerdyOptions,
    pub variables: &'a DynamicVariablesLayout,
    pub kinematics: &'a BerdyKinematics,
}

impl<'a> AssemblyContext<'a> {
    /// Returns the range of a link variable, if it is part of `d`.
    fn link_range(&self, variable_type: VarType, link: LinkIndex) -> Option<IndexRange> {
        self.variables.link_range(variable_type, link)
    }

    /// Returns the range of the variable of the given type of the parent joint of the link.
    fn parent_joint_range(&self, variable_type: VarType, link: LinkIndex) -> Option<IndexRange> {
        self.traversal
            .parent_joint(link)
            .and_then(|joint| self.variables.joint_range(variable_type, joint))
    }

    /// Adds `sign * link_X*_child` for the joint wrench of every child of the link.
    fn add_child_joint_wrenches(&self, builder: &mut MatrixBuilder, row: usize, link: LinkIndex, sign: f64) {
        for child in self.traversal.children(link) {
            if let Some(range) = self.parent_joint_range(VarType::JointWrench, *child) {
                let link_h_child = self.kinematics.link_h_parent[child.index()].inverse();
                builder.add_block(row, range.offset, &(force_adjoint(&link_h_child) * sign));
            }
        }
    }

    /// Adds the acceleration propagation `a_L - L_X_P a_P - S ddq - v_L × (S dq) = 0` of a
    /// non-base link. A parent without an acceleration variable has the known base acceleration.
    fn add_acceleration_propagation(
        &self,
        builder: &mut MatrixBuilder,
        bias: &mut DVector<f64>,
        row: usize,
        link: LinkIndex,
    ) {
        let parent = match self.traversal.parent_link(link) {
            Some(p) => p,
            None => return,
        };

        let link_x_parent = motion_adjoint(&self.kinematics.link_h_parent[link.index()]);
        let subspace = self.kinematics.motion_subspaces[link.index()];
        let dq = self.parent_dof_value(&self.kinematics.joint_velocities, link);

        if let Some(range) = self.link_range(VarType::LinkBodyProperAcceleration, link) {
            builder.add_diagonal(row, range.offset, 6, 1.0);
        }

        let mut b = -(cross_motion(&self.kinematics.twists[link.index()]) * (subspace * dq));
        match self.link_range(VarType::LinkBodyProperAcceleration, parent) {
            Some(range) => builder.add_block(row, range.offset, &(-link_x_parent)),
            None => b -= link_x_parent * self.kinematics.base_proper_acceleration,
        }

        if let Some(range) = self.parent_joint_range(VarType::DofAcceleration, link) {
            builder.add_block(row, range.offset, &(-subspace));
        }

        bias.rows_mut(row, 6).copy_from(&b);
    }

    fn parent_dof_value(&self, values: &DVector<f64>, link: LinkIndex) -> f64 {
        match self.traversal.parent_joint(link) {
            Some(joint) => crate::dynamics::joint_value(self.model.joint_unchecked(joint), values),
            None => 0.0,
        }
    }

    fn spatial_inertia(&self, link: LinkIndex) -> &Matrix6<f64> {
        self.model.link_unchecked(link).spatial_inertia()
    }

    /// Returns `v ×* (I v)` for the link.
    fn velocity_wrench(&self, link: LinkIndex) -> na::Vector6<f64> {
        let twist = self.kinematics.twists[link.index()];
        cross_force(&twist) * (self.spatial_inertia(link) * twist)
    }
}

/// Defines a formulation of the BERDY problem: its dynamic variables, its equations and the
/// measurement of the joint torques.
pub(crate) trait BerdyVariantStrategy {
    /// Returns the dynamic variables in the order in which they appear in `d`.
    fn dynamic_variables(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        options: &BerdyOptions,
    ) -> DynamicVariablesLayout;

    /// Returns the number of rows of `D`.
    fn nr_of_dynamic_equations(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        options: &BerdyOptions,
    ) -> usize;

    /// Computes `D` and `bD`.
    fn dynamics_matrices(&self, context: &AssemblyContext) -> (CscMatrix<f64>, DVector<f64>);

    /// Adds the measurement rows of the torque of the parent joint of the link.
    fn add_dof_torque_measurement(
        &self,
        context: &AssemblyContext,
        builder: &mut MatrixBuilder,
        row: usize,
        link: LinkIndex,
    );
}

/// The original formulation for a model with a fixed base.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FixedBaseStrategy;

impl BerdyVariantStrategy for FixedBaseStrategy {
    fn dynamic_variables(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        options: &BerdyOptions,
    ) -> DynamicVariablesLayout {
        let mut layout = DynamicVariablesLayout::new();

        let base = traversal.base_link();
        if options.include_fixed_base_external_wrench {
            layout.push(
                VarType::NetExtWrench,
                base.index(),
                model.link_unchecked(base).name(),
                6,
            );
        }

        for link in traversal.links().iter().skip(1) {
            let joint_index = match traversal.parent_joint(*link) {
                Some(j) => j,
                None => continue,
            };

            let link_name = model.link_unchecked(*link).name();
            let joint = model.joint_unchecked(joint_index);

            layout.push(VarType::LinkBodyProperAcceleration, link.index(), link_name, 6);
            layout.push(
                VarType::NetIntAndExtWrenchesOnLinkWithoutGrav,
                link.index(),
                link_name,
                6,
            );
            layout.push(VarType::JointWrench, joint_index.index(), joint.name(), 6);
            layout.push(
                VarType::DofTorque,
                joint_index.index(),
                joint.name(),
                joint.nr_of_dofs(),
            );
            if options.include_all_net_external_wrenches_as_dynamic_variables {
                layout.push(VarType::NetExtWrench, link.index(), link_name, 6);
            }
            layout.push(
                VarType::DofAcceleration,
                joint_index.index(),
                joint.name(),
                joint.nr_of_dofs(),
            );
        }

        layout
    }

    fn nr_of_dynamic_equations(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        options: &BerdyOptions,
    ) -> usize {
        let base_equations = if options.include_fixed_base_external_wrench {
            6
        } else {
            0
        };

        base_equations + 18 * (traversal.nr_of_visited_links() - 1) + model.nr_of_dofs()
    }

    fn dynamics_matrices(&self, context: &AssemblyContext) -> (CscMatrix<f64>, DVector<f64>) {
        let nr_of_equations =
            self.nr_of_dynamic_equations(context.model, context.traversal, context.options);
        let mut builder = MatrixBuilder::new(nr_of_equations, context.variables.size());
        let mut bias = DVector::zeros(nr_of_equations);
        let mut row = 0;

        let base = context.traversal.base_link();
        if let Some(range) = context.link_range(VarType::NetExtWrench, base) {
            // -f^x_B + sum_C B_X*_C f_C + I_B a_B + v_B ×* (I_B v_B) = 0
            builder.add_diagonal(row, range.offset, 6, -1.0);
            context.add_child_joint_wrenches(&mut builder, row, base, 1.0);
            let b = net_wrench_without_gravity(
                context.spatial_inertia(base),
                &context.kinematics.base_proper_acceleration,
                &context.kinematics.twists[base.index()],
            );
            bias.rows_mut(row, 6).copy_from(&b);
            row += 6;
        }

        for link in context.traversal.links().iter().skip(1) {
            context.add_acceleration_propagation(&mut builder, &mut bias, row, *link);
            row += 6;

            // f^B_L - I a_L - v ×* (I v) = 0
            let net_wrench = context.link_range(VarType::NetIntAndExtWrenchesOnLinkWithoutGrav, *link);
            if let Some(range) = net_wrench {
                builder.add_diagonal(row, range.offset, 6, 1.0);
            }
            if let Some(range) = context.link_range(VarType::LinkBodyProperAcceleration, *link) {
                builder.add_block(row, range.offset, &(-context.spatial_inertia(*link)));
            }
            bias.rows_mut(row, 6)
                .copy_from(&(-context.velocity_wrench(*link)));
            row += 6;

            // f_j - f^B_L + f^x_L - sum_C L_X*_C f_C = 0
            let joint_wrench = context.parent_joint_range(VarType::JointWrench, *link);
            if let Some(range) = joint_wrench {
                builder.add_diagonal(row, range.offset, 6, 1.0);
            }
            if let Some(range) = net_wrench {
                builder.add_diagonal(row, range.offset, 6, -1.0);
            }
            if let Some(range) = context.link_range(VarType::NetExtWrench, *link) {
                builder.add_diagonal(row, range.offset, 6, 1.0);
            }
            context.add_child_joint_wrenches(&mut builder, row, *link, -1.0);
            row += 6;

            // tau_j - S^T f_j = 0
            if let Some(torque) = context.parent_joint_range(VarType::DofTorque, *link) {
                builder.add_diagonal(row, torque.offset, torque.size, 1.0);
                if let Some(range) = joint_wrench {
                    let subspace = context.kinematics.motion_subspaces[link.index()];
                    builder.add_block(row, range.offset, &(-subspace.transpose()));
                }
                row += torque.size;
            }
        }

        debug_assert_eq!(row, nr_of_equations);
        (builder.build(), bias)
    }

    fn add_dof_torque_measurement(
        &self,
        context: &AssemblyContext,
        builder: &mut MatrixBuilder,
        row: usize,
        link: LinkIndex,
    ) {
        if let Some(range) = context.parent_joint_range(VarType::DofTorque, link) {
            builder.add_diagonal(row, range.offset, range.size, 1.0);
        }
    }
}

/// The formulation for a floating base model.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FloatingBaseStrategy;

impl BerdyVariantStrategy for FloatingBaseStrategy {
    fn dynamic_variables(
        &self,
        model: &Model,
        traversal: &DynamicTraversal,
        _options: &BerdyOptions,
    ) -> DynamicVariablesLayout {
        let mut layout = DynamicVariablesLayout::new();

        for link in traversal.links() {
            let link_name = model.link_unchecked(*link).name();
            layout.push(VarType::LinkBodyProperAcceleration, link.index(), link_name, 6);
            layout.push(VarType::NetExtWrench, link.index(), link_name, 6);

            if let Some(joint_index) = traversal.parent_joint(*link) {
                let joint = model.joint_unchecked(joint_index);
                layout.push(VarType::JointWrench, joint_index.index(), joint.name(), 6);
                layout.push(
                    VarType::DofAcceleration,
                    joint_index.index(),
                    joint.name(),
                    joint.nr_of_dofs(),
                );
            }
        }

        layout
    }

    fn nr_of_dynamic_equations(
        &self,
        _model: &Model,
        traversal: &DynamicTraversal,
        _options: &BerdyOptions,
    ) -> usize {
        let nr_of_links = traversal.nr_of_visited_links();
        6 * nr_of_links + 6 * (nr_of_links - 1)
    }

    fn dynamics_matrices(&self, context: &AssemblyContext) -> (CscMatrix<f64>, DVector<f64>) {
        let nr_of_equations =
            self.nr_of_dynamic_equations(context.model, context.traversal, context.options);
        let mut builder = MatrixBuilder::new(nr_of_equations, context.variables.size());
        let mut bias = DVector::zeros(nr_of_equations);
        let mut row = 0;

        for link in context.traversal.links() {
            // I a_L - f^x_L - f_j + sum_C L_X*_C f_C + v ×* (I v) = 0
            if let Some(range) = context.link_range(VarType::LinkBodyProperAcceleration, *link) {
                builder.add_block(row, range.offset, context.spatial_inertia(*link));
            }
            if let Some(range) = context.link_range(VarType::NetExtWrench, *link) {
                builder.add_diagonal(row, range.offset, 6, -1.0);
            }
            if let Some(range) = context.parent_joint_range(VarType::JointWrench, *link) {
                builder.add_diagonal(row, range.offset, 6, -1.0);
            }
            context.add_child_joint_wrenches(&mut builder, row, *link, 1.0);
            bias.rows_mut(row, 6)
                .copy_from(&context.velocity_wrench(*link));
            row += 6;

            if !context.traversal.is_base(*link) {
                context.add_acceleration_propagation(&mut builder, &mut bias, row, *link);
                row += 6;
            }
        }

        debug_assert_eq!(row, nr_of_equations);
        (builder.build(), bias)
    }

    fn add_dof_torque_measurement(
        &self,
        context: &AssemblyContext,
        builder: &mut MatrixBuilder,
        row: usize,
        link: LinkIndex,
    ) {
        let joint = match context.traversal.parent_joint(link) {
            Some(j) => context.model.joint_unchecked(j),
            None => return,
        };

        // tau = S^T f_j
        if joint.nr_of_dofs() > 0 {
            if let Some(range) = context.parent_joint_range(VarType::JointWrench, link) {
                let subspace = context.kinematics.motion_subspaces[link.index()];
                builder.add_block(row, range.offset, &subspace.transpose());
            }
        }
    }
}

/// Returns the strategy that implements the given variant.
pub(crate) fn strategy_for(variant: BerdyVariant) -> &'static dyn BerdyVariantStrategy {
    match variant {
        BerdyVariant::OriginalBerdyFixedBase => &FixedBaseStrategy,
        BerdyVariant::BerdyFloatingBase => &FloatingBaseStrategy,
    }
}
