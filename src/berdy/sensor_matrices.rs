//! Assembly of the measurement system `Y * d + bY = y`.

extern crate nalgebra as na;

use na::{DVector, Isometry3, Matrix3, Matrix3x6, Vector3};
use nalgebra_sparse::CscMatrix;

use crate::{
    sensors::sensor_elements::{ResolvedLinkSensor, ResolvedSixAxisSensor},
    spatial::{angular, force_adjoint, linear, skew},
};

use super::{
    dynamics_matrices::{AssemblyContext, BerdyVariantStrategy},
    sparse::MatrixBuilder,
    variables::{BerdyDynamicVariablesTypes, SensorSource, SensorsLayout},
};

type VarType = BerdyDynamicVariablesTypes;

fn sensor_r_link(link_h_sensor: &Isometry3<f64>) -> Matrix3<f64> {
    link_h_sensor.rotation.to_rotation_matrix().matrix().transpose()
}

fn add_six_axis_force_torque(
    context: &AssemblyContext,
    builder: &mut MatrixBuilder,
    row: usize,
    sensor: &ResolvedSixAxisSensor,
) {
    let child = match context.traversal.child_link_of_joint(sensor.joint) {
        Some(c) => c,
        None => return,
    };
    let range = match context.variables.joint_range(VarType::JointWrench, sensor.joint) {
        Some(r) => r,
        None => return,
    };

    let sensor_x_applied = force_adjoint(&sensor.link_h_sensor.inverse());
    let block = if sensor.applied_link == child {
        sensor_x_applied
    } else {
        // The sensor measures the reaction of the child on the parent
        let parent_h_child = context.kinematics.link_h_parent[child.index()].inverse();
        -(sensor_x_applied * force_adjoint(&parent_h_child))
    };

    builder.add_block(row, range.offset, &block);
}

fn add_accelerometer(
    context: &AssemblyContext,
    builder: &mut MatrixBuilder,
    bias: &mut DVector<f64>,
    row: usize,
    sensor: &ResolvedLinkSensor,
) {
    let sensor_r_link = sensor_r_link(&sensor.link_h_sensor);
    let position = sensor.link_h_sensor.translation.vector;

    // The acceleration of the sensor origin: a_lin + dw x p = [I | -p^] a
    let mut jacobian = Matrix3x6::zeros();
    jacobian
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&Matrix3::identity());
    jacobian
        .fixed_view_mut::<3, 3>(0, 3)
        .copy_from(&(-skew(&position)));
    let jacobian = sensor_r_link * jacobian;

    let twist = context.kinematics.twists[sensor.link.index()];
    let omega = angular(&twist);
    let mut b: Vector3<f64> =
        sensor_r_link * (omega.cross(&linear(&twist)) + omega.cross(&omega.cross(&position)));

    match context
        .variables
        .link_range(VarType::LinkBodyProperAcceleration, sensor.link)
    {
        Some(range) => builder.add_block(row, range.offset, &jacobian),
        None => b += jacobian * context.kinematics.base_proper_acceleration,
    }

    bias.rows_mut(row, 3).copy_from(&b);
}

fn add_gyroscope(context: &AssemblyContext, bias: &mut DVector<f64>, row: usize, sensor: &ResolvedLinkSensor) {
    let omega = angular(&context.kinematics.twists[sensor.link.index()]);
    bias.rows_mut(row, 3)
        .copy_from(&(sensor_r_link(&sensor.link_h_sensor) * omega));
}

fn add_angular_accelerometer(
    context: &AssemblyContext,
    builder: &mut MatrixBuilder,
    bias: &mut DVector<f64>,
    row: usize,
    sensor: &ResolvedLinkSensor,
) {
    let sensor_r_link = sensor_r_link(&sensor.link_h_sensor);
    match context
        .variables
        .link_range(VarType::LinkBodyProperAcceleration, sensor.link)
    {
        Some(range) => builder.add_block(row, range.offset + 3, &sensor_r_link),
        None => {
            let omega_dot = angular(&context.kinematics.base_proper_acceleration);
            bias.rows_mut(row, 3).copy_from(&(sensor_r_link * omega_dot));
        }
    }
}

fn add_contact(
    context: &AssemblyContext,
    builder: &mut MatrixBuilder,
    row: usize,
    sensor: &ResolvedLinkSensor,
) {
    if let Some(range) = context
        .variables
        .link_range(VarType::NetExtWrench, sensor.link)
    {
        // Normal force followed by the two tangential torques
        let sensor_x_link = force_adjoint(&sensor.link_h_sensor.inverse());
        builder.add_block(row, range.offset, &sensor_x_link.fixed_rows::<3>(2));
    }
}

/// Computes `Y` and `bY` for the sensors in the given layout.
pub(crate) fn sensor_matrices(
    context: &AssemblyContext,
    strategy: &dyn BerdyVariantStrategy,
    sensors: &SensorsLayout,
) -> (CscMatrix<f64>, DVector<f64>) {
    let mut builder = MatrixBuilder::new(sensors.size(), context.variables.size());
    let mut bias = DVector::zeros(sensors.size());

    for (sensor, source) in sensors.entries() {
        let row = sensor.range.offset;
        match source {
            SensorSource::SixAxisForceTorque(resolved) => {
                add_six_axis_force_torque(context, &mut builder, row, resolved)
            }
            SensorSource::Accelerometer(resolved) => {
                add_accelerometer(context, &mut builder, &mut bias, row, resolved)
            }
            SensorSource::Gyroscope(resolved) => add_gyroscope(context, &mut bias, row, resolved),
            SensorSource::ThreeAxisAngularAccelerometer(resolved) => {
                add_angular_accelerometer(context, &mut builder, &mut bias, row, resolved)
            }
            SensorSource::ThreeAxisForceTorqueContact(resolved) => {
                add_contact(context, &mut builder, row, resolved)
            }
            SensorSource::DofAcceleration(joint) => {
                if let Some(range) = context.variables.joint_range(VarType::DofAcceleration, *joint) {
                    builder.add_diagonal(row, range.offset, range.size, 1.0);
                }
            }
            SensorSource::DofTorque(joint) => {
                if let Some(child) = context.traversal.child_link_of_joint(*joint) {
                    strategy.add_dof_torque_measurement(context, &mut builder, row, child);
                }
            }
            SensorSource::NetExtWrench(link) => {
                if let Some(range) = context.variables.link_range(VarType::NetExtWrench, *link) {
                    builder.add_diagonal(row, range.offset, range.size, 1.0);
                }
            }
            SensorSource::JointWrench(joint) => {
                if let Some(range) = context.variables.joint_range(VarType::JointWrench, *joint) {
                    builder.add_diagonal(row, range.offset, range.size, 1.0);
                }
            }
        }
    }

    (builder.build(), bias)
}
