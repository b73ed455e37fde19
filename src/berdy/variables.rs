//! Defines the dynamic variables and the sensors of a BERDY problem and the order in which they
//! appear in the vectors `d` and `y`.

use std::{collections::HashMap, fmt::Display, ops::Range};

use crate::{
    model_elements::{
        frame_elements::{JointIndex, LinkIndex},
        model::{DynamicTraversal, Model},
    },
    sensors::sensor_elements::{
        ResolvedLinkSensor, ResolvedSixAxisSensor, SensorType, SensorsList,
    },
    Error,
};

use super::{dynamics_matrices::strategy_for, options::BerdyOptions};

#[cfg(test)]
#[path = "variables_tests.rs"]
mod variables_tests;

/// Defines the types of the dynamic variables.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BerdyDynamicVariablesTypes {
    /// The proper acceleration of a link, expressed in the link frame.
    LinkBodyProperAcceleration,
    /// The sum of all wrenches acting on a link, excluding gravity, expressed in the link frame.
    NetIntAndExtWrenchesOnLinkWithoutGrav,
    /// The wrench that the traversal parent applies on the child of a joint, expressed in the
    /// frame of the child.
    JointWrench,
    /// The torque of a degree of freedom.
    DofTorque,
    /// The net external wrench acting on a link, expressed in the link frame.
    NetExtWrench,
    /// The acceleration of a degree of freedom.
    DofAcceleration,
}

impl BerdyDynamicVariablesTypes {
    /// Returns a value indicating whether the variable belongs to a link. Otherwise it belongs
    /// to a joint.
    pub fn is_link_variable(&self) -> bool {
        matches!(
            self,
            BerdyDynamicVariablesTypes::LinkBodyProperAcceleration
                | BerdyDynamicVariablesTypes::NetIntAndExtWrenchesOnLinkWithoutGrav
                | BerdyDynamicVariablesTypes::NetExtWrench
        )
    }
}

impl Display for BerdyDynamicVariablesTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BerdyDynamicVariablesTypes::LinkBodyProperAcceleration => {
                "LINK_BODY_PROPER_ACCELERATION"
            }
            BerdyDynamicVariablesTypes::NetIntAndExtWrenchesOnLinkWithoutGrav => {
                "NET_INT_AND_EXT_WRENCHES_ON_LINK_WITHOUT_GRAV"
            }
            BerdyDynamicVariablesTypes::JointWrench => "JOINT_WRENCH",
            BerdyDynamicVariablesTypes::DofTorque => "DOF_TORQUE",
            BerdyDynamicVariablesTypes::NetExtWrench => "NET_EXT_WRENCH",
            BerdyDynamicVariablesTypes::DofAcceleration => "DOF_ACCELERATION",
        };
        write!(f, "{}", name)
    }
}

/// Defines the types of the measurements.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BerdySensorTypes {
    /// A six axis force/torque sensor.
    SixAxisForceTorqueSensor,
    /// An accelerometer.
    AccelerometerSensor,
    /// A gyroscope.
    GyroscopeSensor,
    /// A three axis angular accelerometer.
    ThreeAxisAngularAccelerometerSensor,
    /// A three axis force/torque contact sensor.
    ThreeAxisForceTorqueContactSensor,
    /// The acceleration of a degree of freedom.
    DofAccelerationSensor,
    /// The torque of a degree of freedom.
    DofTorqueSensor,
    /// The net external wrench on a link.
    NetExtWrenchSensor,
    /// The internal wrench of a joint.
    JointWrenchSensor,
}

impl Display for BerdySensorTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BerdySensorTypes::SixAxisForceTorqueSensor => {
                SensorType::SixAxisForceTorque.fmt(f)
            }
            BerdySensorTypes::AccelerometerSensor => SensorType::Accelerometer.fmt(f),
            BerdySensorTypes::GyroscopeSensor => SensorType::Gyroscope.fmt(f),
            BerdySensorTypes::ThreeAxisAngularAccelerometerSensor => {
                SensorType::ThreeAxisAngularAccelerometer.fmt(f)
            }
            BerdySensorTypes::ThreeAxisForceTorqueContactSensor => {
                SensorType::ThreeAxisForceTorqueContact.fmt(f)
            }
            BerdySensorTypes::DofAccelerationSensor => write!(f, "DOF_ACCELERATION_SENSOR"),
            BerdySensorTypes::DofTorqueSensor => write!(f, "DOF_TORQUE_SENSOR"),
            BerdySensorTypes::NetExtWrenchSensor => write!(f, "NET_EXT_WRENCH_SENSOR"),
            BerdySensorTypes::JointWrenchSensor => write!(f, "JOINT_WRENCH_SENSOR"),
        }
    }
}

impl From<SensorType> for BerdySensorTypes {
    fn from(sensor_type: SensorType) -> Self {
        match sensor_type {
            SensorType::SixAxisForceTorque => BerdySensorTypes::SixAxisForceTorqueSensor,
            SensorType::Accelerometer => BerdySensorTypes::AccelerometerSensor,
            SensorType::Gyroscope => BerdySensorTypes::GyroscopeSensor,
            SensorType::ThreeAxisAngularAccelerometer => {
                BerdySensorTypes::ThreeAxisAngularAccelerometerSensor
            }
            SensorType::ThreeAxisForceTorqueContact => {
                BerdySensorTypes::ThreeAxisForceTorqueContactSensor
            }
        }
    }
}

/// A contiguous range of elements in a vector.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexRange {
    /// The index of the first element.
    pub offset: usize,
    /// The number of elements.
    pub size: usize,
}

impl IndexRange {
    /// Returns the range as a standard library range.
    pub fn as_range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

/// A dynamic variable and its position in the vector `d`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BerdyDynamicVariable {
    /// The type of the variable.
    pub variable_type: BerdyDynamicVariablesTypes,
    /// The name of the link or joint the variable belongs to.
    pub id: String,
    /// The position of the variable in `d`.
    pub range: IndexRange,
}

/// A measurement and its position in the vector `y`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BerdySensor {
    /// The type of the measurement.
    pub sensor_type: BerdySensorTypes,
    /// The name of the sensor, or of the link or joint for the virtual sensors.
    pub id: String,
    /// The position of the measurement in `y`.
    pub range: IndexRange,
}

/// The ordered dynamic variables together with a lookup from (type, element) to their range.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DynamicVariablesLayout {
    ordering: Vec<BerdyDynamicVariable>,

    /// The index of the link or joint of each variable, in ordering order.
    elements: Vec<usize>,
    ranges: HashMap<(BerdyDynamicVariablesTypes, usize), IndexRange>,
    size: usize,
}

impl DynamicVariablesLayout {
    /// Returns the variables with the index of their link or joint, in ordering order.
    pub fn entries(&self) -> impl Iterator<Item = (&BerdyDynamicVariable, usize)> {
        self.ordering.iter().zip(self.elements.iter().copied())
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn ordering(&self) -> &[BerdyDynamicVariable] {
        &self.ordering
    }

    /// Appends a variable of the given size. Variables without elements are not stored.
    pub fn push(
        &mut self,
        variable_type: BerdyDynamicVariablesTypes,
        element: usize,
        id: &str,
        size: usize,
    ) {
        if size == 0 {
            return;
        }

        let range = IndexRange {
            offset: self.size,
            size,
        };
        self.size += size;
        self.ranges.insert((variable_type, element), range);
        self.elements.push(element);
        self.ordering.push(BerdyDynamicVariable {
            variable_type,
            id: id.to_string(),
            range,
        });
    }

    pub fn range(
        &self,
        variable_type: BerdyDynamicVariablesTypes,
        element: usize,
    ) -> Option<IndexRange> {
        self.ranges.get(&(variable_type, element)).copied()
    }

    pub fn link_range(
        &self,
        variable_type: BerdyDynamicVariablesTypes,
        link: LinkIndex,
    ) -> Option<IndexRange> {
        self.range(variable_type, link.index())
    }

    pub fn joint_range(
        &self,
        variable_type: BerdyDynamicVariablesTypes,
        joint: JointIndex,
    ) -> Option<IndexRange> {
        self.range(variable_type, joint.index())
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// The quantity a measurement row block is computed from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SensorSource {
    SixAxisForceTorque(ResolvedSixAxisSensor),
    Accelerometer(ResolvedLinkSensor),
    Gyroscope(ResolvedLinkSensor),
    ThreeAxisAngularAccelerometer(ResolvedLinkSensor),
    ThreeAxisForceTorqueContact(ResolvedLinkSensor),
    DofAcceleration(JointIndex),
    DofTorque(JointIndex),
    NetExtWrench(LinkIndex),
    JointWrench(JointIndex),
}

/// The ordered measurements together with the quantity each of them is computed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SensorsLayout {
    ordering: Vec<BerdySensor>,
    sources: Vec<SensorSource>,
    size: usize,
}

impl SensorsLayout {
    /// Returns the measurements with their source, in measurement order.
    pub fn entries(&self) -> impl Iterator<Item = (&BerdySensor, &SensorSource)> {
        self.ordering.iter().zip(self.sources.iter())
    }

    pub fn ordering(&self) -> &[BerdySensor] {
        &self.ordering
    }

    fn push(&mut self, sensor_type: BerdySensorTypes, id: &str, size: usize, source: SensorSource) {
        let range = IndexRange {
            offset: self.size,
            size,
        };
        self.size += size;
        self.ordering.push(BerdySensor {
            sensor_type,
            id: id.to_string(),
            range,
        });
        self.sources.push(source);
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Returns the dynamic variables of the BERDY problem in the order in which they appear in `d`.
///
/// The order only depends on the model, the traversal and the options, not on the sensors.
///
/// ## Errors
///
/// * [Error::InvalidOptions] - Returned when the options are not consistent.
/// * [Error::SizeMismatch] - Returned when the traversal does not visit every link of the model.
pub fn dynamic_variables_ordering(
    model: &Model,
    traversal: &DynamicTraversal,
    options: &BerdyOptions,
) -> Result<Vec<BerdyDynamicVariable>, Error> {
    options.check_consistency()?;
    crate::dynamics::check_size(
        "traversal",
        model.nr_of_links(),
        traversal.nr_of_visited_links(),
    )?;

    let layout = strategy_for(options.berdy_variant).dynamic_variables(model, traversal, options);
    Ok(layout.ordering)
}

/// Computes the order of the measurements in `y`: the physical sensors grouped by type, followed
/// by the virtual sensors selected by the options.
pub(crate) fn sensors_layout(
    model: &Model,
    sensors: &SensorsList,
    options: &BerdyOptions,
    variables: &DynamicVariablesLayout,
) -> Result<SensorsLayout, Error> {
    let mut layout = SensorsLayout::default();

    let six_axis_sensors = sensors.resolve_six_axis_force_torque_sensors(model)?;
    for (sensor, resolved) in sensors
        .six_axis_force_torque_sensors()
        .iter()
        .zip(six_axis_sensors)
    {
        layout.push(
            BerdySensorTypes::SixAxisForceTorqueSensor,
            sensor.name(),
            SensorType::SixAxisForceTorque.measurement_size(),
            SensorSource::SixAxisForceTorque(resolved),
        );
    }

    for sensor_type in SensorType::ALL.iter().skip(1) {
        let resolved_sensors = sensors.resolve_link_sensors(*sensor_type, model)?;
        for (sensor, resolved) in sensors
            .link_sensors(*sensor_type)
            .iter()
            .zip(resolved_sensors)
        {
            let source = match sensor_type {
                SensorType::Accelerometer => SensorSource::Accelerometer(resolved),
                SensorType::Gyroscope => SensorSource::Gyroscope(resolved),
                SensorType::ThreeAxisAngularAccelerometer => {
                    SensorSource::ThreeAxisAngularAccelerometer(resolved)
                }
                SensorType::ThreeAxisForceTorqueContact => {
                    if variables
                        .link_range(BerdyDynamicVariablesTypes::NetExtWrench, resolved.link)
                        .is_none()
                    {
                        return Err(Error::InconsistentSensorModel {
                            reason: format!(
                                "the contact sensor {} is attached to the link {} whose external wrench is not a dynamic variable",
                                sensor.name(),
                                sensor.parent_link()
                            ),
                        });
                    }

                    SensorSource::ThreeAxisForceTorqueContact(resolved)
                }
                SensorType::SixAxisForceTorque => continue,
            };

            layout.push(
                (*sensor_type).into(),
                sensor.name(),
                sensor_type.measurement_size(),
                source,
            );
        }
    }

    if options.include_all_joint_accelerations_as_sensors {
        for (index, joint) in model.joints().iter().enumerate() {
            if joint.nr_of_dofs() > 0 {
                layout.push(
                    BerdySensorTypes::DofAccelerationSensor,
                    joint.name(),
                    joint.nr_of_dofs(),
                    SensorSource::DofAcceleration(JointIndex::new(index)),
                );
            }
        }
    }

    if options.include_all_joint_torques_as_sensors {
        for (index, joint) in model.joints().iter().enumerate() {
            if joint.nr_of_dofs() > 0 {
                layout.push(
                    BerdySensorTypes::DofTorqueSensor,
                    joint.name(),
                    joint.nr_of_dofs(),
                    SensorSource::DofTorque(JointIndex::new(index)),
                );
            }
        }
    }

    if options.include_all_net_external_wrenches_as_sensors {
        for (index, link) in model.links().iter().enumerate() {
            let link_index = LinkIndex::new(index);
            if variables
                .link_range(BerdyDynamicVariablesTypes::NetExtWrench, link_index)
                .is_some()
            {
                layout.push(
                    BerdySensorTypes::NetExtWrenchSensor,
                    link.name(),
                    6,
                    SensorSource::NetExtWrench(link_index),
                );
            }
        }
    }

    for joint_name in &options.joint_on_which_the_internal_wrench_is_measured {
        let joint = model
            .joint_index(joint_name)
            .map_err(|_| Error::InconsistentSensorModel {
                reason: format!("the internal wrench of the unknown joint {} is measured", joint_name),
            })?;

        layout.push(
            BerdySensorTypes::JointWrenchSensor,
            joint_name,
            6,
            SensorSource::JointWrench(joint),
        );
    }

    Ok(layout)
}
