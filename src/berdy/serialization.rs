//! Packs numeric quantities into the vectors `d` and `y`, following the variable orderings.

extern crate nalgebra as na;

use na::DVector;

use crate::{
    dynamics::check_size,
    model_elements::{
        frame_elements::JointIndex,
        model::{DynamicTraversal, Model},
    },
    sensors::sensor_elements::{SensorType, SensorsList, SensorsMeasurements},
    spatial::{SpatialAcc, Wrench},
    Error,
};

use super::variables::{BerdyDynamicVariablesTypes, DynamicVariablesLayout, SensorSource, SensorsLayout};

type VarType = BerdyDynamicVariablesTypes;

fn joint_dofs<'a>(
    model: &Model,
    joint: JointIndex,
    values: &'a DVector<f64>,
) -> na::DVectorView<'a, f64> {
    let joint = model.joint_unchecked(joint);
    values.rows(joint.dof_offset(), joint.nr_of_dofs())
}

fn joint_wrench(
    traversal: &DynamicTraversal,
    joint: JointIndex,
    internal_wrenches: &[Wrench],
) -> Wrench {
    traversal
        .child_link_of_joint(joint)
        .map(|child| internal_wrenches[child.index()])
        .unwrap_or_else(Wrench::zeros)
}

/// Writes the dynamic variables into a vector ordered like `variables`.
///
/// Link buffers are indexed by link index, joint buffers by degree of freedom. `internal_wrenches`
/// holds per link the wrench that its traversal parent applies on it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn serialize_dynamic_variables(
    model: &Model,
    traversal: &DynamicTraversal,
    variables: &DynamicVariablesLayout,
    link_proper_accelerations: &[SpatialAcc],
    link_net_wrenches_without_gravity: &[Wrench],
    external_wrenches: &[Wrench],
    internal_wrenches: &[Wrench],
    joint_torques: &DVector<f64>,
    joint_accelerations: &DVector<f64>,
) -> Result<DVector<f64>, Error> {
    let nr_of_links = model.nr_of_links();
    check_size("link proper accelerations", nr_of_links, link_proper_accelerations.len())?;
    check_size("link net wrenches", nr_of_links, link_net_wrenches_without_gravity.len())?;
    check_size("external wrenches", nr_of_links, external_wrenches.len())?;
    check_size("internal wrenches", nr_of_links, internal_wrenches.len())?;
    check_size("joint torques", model.nr_of_dofs(), joint_torques.len())?;
    check_size("joint accelerations", model.nr_of_dofs(), joint_accelerations.len())?;

    let mut d = DVector::zeros(variables.size());
    for (variable, element) in variables.entries() {
        let mut target = d.rows_mut(variable.range.offset, variable.range.size);
        match variable.variable_type {
            VarType::LinkBodyProperAcceleration => {
                target.copy_from(&link_proper_accelerations[element])
            }
            VarType::NetIntAndExtWrenchesOnLinkWithoutGrav => {
                target.copy_from(&link_net_wrenches_without_gravity[element])
            }
            VarType::NetExtWrench => target.copy_from(&external_wrenches[element]),
            VarType::JointWrench => target.copy_from(&joint_wrench(
                traversal,
                JointIndex::new(element),
                internal_wrenches,
            )),
            VarType::DofTorque => {
                target.copy_from(&joint_dofs(model, JointIndex::new(element), joint_torques))
            }
            VarType::DofAcceleration => target.copy_from(&joint_dofs(
                model,
                JointIndex::new(element),
                joint_accelerations,
            )),
        }
    }

    Ok(d)
}

/// Writes the measurements of the physical and the virtual sensors into a vector ordered like
/// `sensors_layout`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn serialize_sensor_variables(
    model: &Model,
    traversal: &DynamicTraversal,
    sensors: &SensorsList,
    sensors_layout: &SensorsLayout,
    measurements: &SensorsMeasurements,
    external_wrenches: &[Wrench],
    joint_torques: &DVector<f64>,
    joint_accelerations: &DVector<f64>,
    internal_wrenches: &[Wrench],
) -> Result<DVector<f64>, Error> {
    for sensor_type in SensorType::ALL {
        check_size(
            &format!("{} measurements", sensor_type),
            sensors.nr_of_sensors(sensor_type),
            measurements.nr_of_sensors(sensor_type),
        )?;
    }

    let nr_of_links = model.nr_of_links();
    check_size("external wrenches", nr_of_links, external_wrenches.len())?;
    check_size("joint torques", model.nr_of_dofs(), joint_torques.len())?;
    check_size("joint accelerations", model.nr_of_dofs(), joint_accelerations.len())?;
    check_size("internal wrenches", nr_of_links, internal_wrenches.len())?;

    let mut y = DVector::zeros(sensors_layout.size());
    let mut next_index = [0_usize; SensorType::ALL.len()];
    for (sensor, source) in sensors_layout.entries() {
        let mut target = y.rows_mut(sensor.range.offset, sensor.range.size);

        let physical_type = match source {
            SensorSource::SixAxisForceTorque(_) => Some(SensorType::SixAxisForceTorque),
            SensorSource::Accelerometer(_) => Some(SensorType::Accelerometer),
            SensorSource::Gyroscope(_) => Some(SensorType::Gyroscope),
            SensorSource::ThreeAxisAngularAccelerometer(_) => {
                Some(SensorType::ThreeAxisAngularAccelerometer)
            }
            SensorSource::ThreeAxisForceTorqueContact(_) => {
                Some(SensorType::ThreeAxisForceTorqueContact)
            }
            SensorSource::DofAcceleration(joint) => {
                target.copy_from(&joint_dofs(model, *joint, joint_accelerations));
                None
            }
            SensorSource::DofTorque(joint) => {
                target.copy_from(&joint_dofs(model, *joint, joint_torques));
                None
            }
            SensorSource::NetExtWrench(link) => {
                target.copy_from(&external_wrenches[link.index()]);
                None
            }
            SensorSource::JointWrench(joint) => {
                target.copy_from(&joint_wrench(traversal, *joint, internal_wrenches));
                None
            }
        };

        if let Some(sensor_type) = physical_type {
            let index = &mut next_index[sensor_type as usize];
            target.copy_from(measurements.measurement(sensor_type, *index)?);
            *index += 1;
        }
    }

    Ok(y)
}

/// Reads the value of a single dynamic variable from `d`.
///
/// ## Errors
///
/// * [Error::SizeMismatch] - Returned when `d` does not have the size of the ordering.
/// * [Error::MissingDynamicVariable] - Returned when there is no variable with the given type
///   and identifier.
pub(crate) fn extract_dynamic_variable(
    variables: &DynamicVariablesLayout,
    d: &DVector<f64>,
    variable_type: BerdyDynamicVariablesTypes,
    id: &str,
) -> Result<DVector<f64>, Error> {
    check_size("dynamic variables", variables.size(), d.len())?;

    variables
        .ordering()
        .iter()
        .find(|v| v.variable_type == variable_type && v.id == id)
        .map(|v| d.rows(v.range.offset, v.range.size).into_owned())
        .ok_or_else(|| Error::MissingDynamicVariable {
            variable_type,
            id: id.to_string(),
        })
}
