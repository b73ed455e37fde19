extern crate nalgebra as na;

use na::{DVector, Vector3};

use crate::{
    dynamics::{check_size, joint_value, state::LinkKinematics},
    model_elements::model::{DynamicTraversal, Model},
    spatial::{angular, force_adjoint, linear, Wrench},
    Error,
};

use super::sensor_elements::{SensorType, SensorsList, SensorsMeasurements};

#[cfg(test)]
#[path = "prediction_tests.rs"]
mod prediction_tests;

/// Computes the measurements that the sensors would produce for the given state of the model.
///
/// ## Parameters
///
/// * 'model' - The model
/// * 'traversal' - The traversal that was used to compute the internal wrenches
/// * 'sensors' - The sensors attached to the model
/// * 'joint_positions' - The joint displacements
/// * 'kinematics' - The twist and proper acceleration of every link
/// * 'external_wrenches' - The net external wrench on each link, expressed in the link frame
/// * 'internal_wrenches' - Per link the wrench that its traversal parent applies on it, expressed
///   in the link frame
///
/// ## Errors
///
/// * [Error::InconsistentSensorModel] - Returned when the sensors do not match the model.
/// * [Error::SizeMismatch] - Returned when one of the buffers is not sized for the model.
pub fn predict_sensors_measurements(
    model: &Model,
    traversal: &DynamicTraversal,
    sensors: &SensorsList,
    joint_positions: &DVector<f64>,
    kinematics: &LinkKinematics,
    external_wrenches: &[Wrench],
    internal_wrenches: &[Wrench],
) -> Result<SensorsMeasurements, Error> {
    let nr_of_links = model.nr_of_links();
    check_size("traversal", nr_of_links, traversal.nr_of_visited_links())?;
    check_size("joint positions", model.nr_of_dofs(), joint_positions.len())?;
    check_size("link twists", nr_of_links, kinematics.twists.len())?;
    check_size(
        "link proper accelerations",
        nr_of_links,
        kinematics.proper_accelerations.len(),
    )?;
    check_size("external wrenches", nr_of_links, external_wrenches.len())?;
    check_size("internal wrenches", nr_of_links, internal_wrenches.len())?;

    let mut measurements = SensorsMeasurements::new(sensors);

    for (index, sensor) in sensors
        .resolve_six_axis_force_torque_sensors(model)?
        .iter()
        .enumerate()
    {
        let child = traversal.child_link_of_joint(sensor.joint).ok_or_else(|| {
            Error::InconsistentSensorModel {
                reason: format!("the joint {} is not part of the traversal", sensor.joint),
            }
        })?;

        let joint_wrench = internal_wrenches[child.index()];
        let wrench_on_applied_link = if sensor.applied_link == child {
            joint_wrench
        } else {
            // Action and reaction: the child pushes back on the parent
            let joint = model.joint_unchecked(sensor.joint);
            let q = joint_value(joint, joint_positions);
            let parent_h_child = joint.transform_to(q, sensor.applied_link);
            -(force_adjoint(&parent_h_child) * joint_wrench)
        };

        let value = force_adjoint(&sensor.link_h_sensor.inverse()) * wrench_on_applied_link;
        measurements.set_measurement(SensorType::SixAxisForceTorque, index, value.as_slice())?;
    }

    for (index, sensor) in sensors
        .resolve_link_sensors(SensorType::Accelerometer, model)?
        .iter()
        .enumerate()
    {
        let twist = kinematics.twists[sensor.link.index()];
        let acc = kinematics.proper_accelerations[sensor.link.index()];
        let omega = angular(&twist);
        let position = sensor.link_h_sensor.translation.vector;

        let in_link: Vector3<f64> = linear(&acc)
            + angular(&acc).cross(&position)
            + omega.cross(&linear(&twist))
            + omega.cross(&omega.cross(&position));
        let value = sensor.link_h_sensor.rotation.inverse() * in_link;
        measurements.set_measurement(SensorType::Accelerometer, index, value.as_slice())?;
    }

    for (index, sensor) in sensors
        .resolve_link_sensors(SensorType::Gyroscope, model)?
        .iter()
        .enumerate()
    {
        let omega = angular(&kinematics.twists[sensor.link.index()]);
        let value = sensor.link_h_sensor.rotation.inverse() * omega;
        measurements.set_measurement(SensorType::Gyroscope, index, value.as_slice())?;
    }

    for (index, sensor) in sensors
        .resolve_link_sensors(SensorType::ThreeAxisAngularAccelerometer, model)?
        .iter()
        .enumerate()
    {
        let omega_dot = angular(&kinematics.proper_accelerations[sensor.link.index()]);
        let value = sensor.link_h_sensor.rotation.inverse() * omega_dot;
        measurements.set_measurement(
            SensorType::ThreeAxisAngularAccelerometer,
            index,
            value.as_slice(),
        )?;
    }

    for (index, sensor) in sensors
        .resolve_link_sensors(SensorType::ThreeAxisForceTorqueContact, model)?
        .iter()
        .enumerate()
    {
        let wrench = force_adjoint(&sensor.link_h_sensor.inverse())
            * external_wrenches[sensor.link.index()];

        // Normal force followed by the two tangential torques
        let value = [wrench[2], wrench[3], wrench[4]];
        measurements.set_measurement(SensorType::ThreeAxisForceTorqueContact, index, &value)?;
    }

    Ok(measurements)
}
