//! Defines the sensors that can be attached to the links and joints of a model, the list that
//! holds them and the container for their measurements.

extern crate nalgebra as na;

use std::fmt::Display;

use na::{DVector, Isometry3};

use crate::{
    model_elements::{
        frame_elements::{JointIndex, LinkIndex},
        model::Model,
    },
    Error,
};

#[cfg(test)]
#[path = "sensor_elements_tests.rs"]
mod sensor_elements_tests;

/// Defines the different kinds of physical sensors.
///
/// The order of the variants is the order in which sensors are grouped in a measurement vector.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorType {
    /// Measures the wrench exchanged between the two links of a joint.
    SixAxisForceTorque,
    /// Measures the proper linear acceleration of a point on a link.
    Accelerometer,
    /// Measures the angular velocity of a link.
    Gyroscope,
    /// Measures the angular acceleration of a link.
    ThreeAxisAngularAccelerometer,
    /// Measures the normal force and the tangential torques of the external wrench on a link.
    ThreeAxisForceTorqueContact,
}

impl SensorType {
    /// All sensor types, in measurement vector order.
    pub const ALL: [SensorType; 5] = [
        SensorType::SixAxisForceTorque,
        SensorType::Accelerometer,
        SensorType::Gyroscope,
        SensorType::ThreeAxisAngularAccelerometer,
        SensorType::ThreeAxisForceTorqueContact,
    ];

    /// Returns the number of values measured by a sensor of this type.
    pub fn measurement_size(&self) -> usize {
        match self {
            SensorType::SixAxisForceTorque => 6,
            SensorType::Accelerometer
            | SensorType::Gyroscope
            | SensorType::ThreeAxisAngularAccelerometer
            | SensorType::ThreeAxisForceTorqueContact => 3,
        }
    }
}

impl Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SensorType::SixAxisForceTorque => "SIX_AXIS_FORCE_TORQUE_SENSOR",
            SensorType::Accelerometer => "ACCELEROMETER_SENSOR",
            SensorType::Gyroscope => "GYROSCOPE_SENSOR",
            SensorType::ThreeAxisAngularAccelerometer => "THREE_AXIS_ANGULAR_ACCELEROMETER_SENSOR",
            SensorType::ThreeAxisForceTorqueContact => "THREE_AXIS_FORCE_TORQUE_CONTACT_SENSOR",
        };
        write!(f, "{}", name)
    }
}

/// Defines a six axis force/torque sensor mounted in a joint.
///
/// The sensor measures the wrench that the other link of the joint applies on the
/// `applied_wrench_link`, expressed in the sensor frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SixAxisForceTorqueSensor {
    name: String,
    parent_joint: String,
    applied_wrench_link: String,
    link_h_sensor: Isometry3<f64>,
}

impl SixAxisForceTorqueSensor {
    /// Returns the name of the link on which the measured wrench is applied.
    pub fn applied_wrench_link(&self) -> &str {
        &self.applied_wrench_link
    }

    /// Returns the transform from the sensor frame to the frame of the applied wrench link.
    pub fn link_h_sensor(&self) -> &Isometry3<f64> {
        &self.link_h_sensor
    }

    /// Returns the name of the sensor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new six axis force/torque sensor.
    ///
    /// ## Parameters
    ///
    /// * 'name' - The name of the sensor
    /// * 'parent_joint' - The name of the joint in which the sensor is mounted
    /// * 'applied_wrench_link' - The name of the link on which the measured wrench is applied.
    ///   Should be one of the links of the joint.
    /// * 'link_h_sensor' - The transform from the sensor frame to the frame of the applied wrench
    ///   link
    pub fn new(
        name: String,
        parent_joint: String,
        applied_wrench_link: String,
        link_h_sensor: Isometry3<f64>,
    ) -> Self {
        Self {
            name,
            parent_joint,
            applied_wrench_link,
            link_h_sensor,
        }
    }

    /// Returns the name of the joint in which the sensor is mounted.
    pub fn parent_joint(&self) -> &str {
        &self.parent_joint
    }
}

/// Defines a sensor that is rigidly attached to a link, e.g. an accelerometer or a gyroscope.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSensor {
    name: String,
    parent_link: String,
    link_h_sensor: Isometry3<f64>,
}

impl LinkSensor {
    /// Returns the transform from the sensor frame to the frame of the parent link.
    pub fn link_h_sensor(&self) -> &Isometry3<f64> {
        &self.link_h_sensor
    }

    /// Returns the name of the sensor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new link sensor.
    ///
    /// ## Parameters
    ///
    /// * 'name' - The name of the sensor
    /// * 'parent_link' - The name of the link to which the sensor is attached
    /// * 'link_h_sensor' - The transform from the sensor frame to the frame of the parent link
    pub fn new(name: String, parent_link: String, link_h_sensor: Isometry3<f64>) -> Self {
        Self {
            name,
            parent_link,
            link_h_sensor,
        }
    }

    /// Returns the name of the link to which the sensor is attached.
    pub fn parent_link(&self) -> &str {
        &self.parent_link
    }
}

/// A six axis force/torque sensor with its names resolved against a model.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedSixAxisSensor {
    pub joint: JointIndex,
    pub applied_link: LinkIndex,
    pub link_h_sensor: Isometry3<f64>,
}

/// A link sensor with its names resolved against a model.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedLinkSensor {
    pub link: LinkIndex,
    pub link_h_sensor: Isometry3<f64>,
}

/// The set of sensors attached to a model.
///
/// Sensors are stored per [SensorType] in insertion order. Sensors refer to links and joints by
/// name, so a list can be created independently of a model and checked against it with
/// [SensorsList::check_consistency].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SensorsList {
    six_axis_force_torque: Vec<SixAxisForceTorqueSensor>,
    accelerometers: Vec<LinkSensor>,
    gyroscopes: Vec<LinkSensor>,
    angular_accelerometers: Vec<LinkSensor>,
    contacts: Vec<LinkSensor>,
}

impl SensorsList {
    /// Adds an accelerometer and returns its index among the accelerometers.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorAlreadyExists] - Returned when an accelerometer with the same name exists.
    pub fn add_accelerometer(&mut self, sensor: LinkSensor) -> Result<usize, Error> {
        Self::add_link_sensor(&mut self.accelerometers, sensor)
    }

    /// Adds a gyroscope and returns its index among the gyroscopes.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorAlreadyExists] - Returned when a gyroscope with the same name exists.
    pub fn add_gyroscope(&mut self, sensor: LinkSensor) -> Result<usize, Error> {
        Self::add_link_sensor(&mut self.gyroscopes, sensor)
    }

    fn add_link_sensor(list: &mut Vec<LinkSensor>, sensor: LinkSensor) -> Result<usize, Error> {
        if list.iter().any(|s| s.name() == sensor.name()) {
            return Err(Error::SensorAlreadyExists {
                name: sensor.name().to_string(),
            });
        }

        list.push(sensor);
        Ok(list.len() - 1)
    }

    /// Adds a six axis force/torque sensor and returns its index among the force/torque sensors.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorAlreadyExists] - Returned when a force/torque sensor with the same name
    ///   exists.
    pub fn add_six_axis_force_torque_sensor(
        &mut self,
        sensor: SixAxisForceTorqueSensor,
    ) -> Result<usize, Error> {
        if self
            .six_axis_force_torque
            .iter()
            .any(|s| s.name() == sensor.name())
        {
            return Err(Error::SensorAlreadyExists {
                name: sensor.name().to_string(),
            });
        }

        self.six_axis_force_torque.push(sensor);
        Ok(self.six_axis_force_torque.len() - 1)
    }

    /// Adds a three axis angular accelerometer and returns its index among the angular
    /// accelerometers.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorAlreadyExists] - Returned when an angular accelerometer with the same name
    ///   exists.
    pub fn add_three_axis_angular_accelerometer(
        &mut self,
        sensor: LinkSensor,
    ) -> Result<usize, Error> {
        Self::add_link_sensor(&mut self.angular_accelerometers, sensor)
    }

    /// Adds a three axis force/torque contact sensor and returns its index among the contact
    /// sensors.
    ///
    /// ## Errors
    ///
    /// * [Error::SensorAlreadyExists] - Returned when a contact sensor with the same name exists.
    pub fn add_three_axis_force_torque_contact_sensor(
        &mut self,
        sensor: LinkSensor,
    ) -> Result<usize, Error> {
        Self::add_link_sensor(&mut self.contacts, sensor)
    }

    /// Checks that every sensor refers to existing links and joints of the model, and that the
    /// applied wrench link of each force/torque sensor is one of the links of its joint.
    ///
    /// ## Errors
    ///
    /// * [Error::InconsistentSensorModel] - Returned when a sensor does not match the model.
    pub fn check_consistency(&self, model: &Model) -> Result<(), Error> {
        self.resolve_six_axis_force_torque_sensors(model)?;
        for sensor_type in SensorType::ALL.iter().skip(1) {
            self.resolve_link_sensors(*sensor_type, model)?;
        }

        Ok(())
    }

    /// Returns a value indicating whether the sensors are consistent with the model.
    pub fn is_consistent(&self, model: &Model) -> bool {
        self.check_consistency(model).is_ok()
    }

    /// Returns the sensors attached to links for the given sensor type. Returns an empty slice
    /// for [SensorType::SixAxisForceTorque].
    pub fn link_sensors(&self, sensor_type: SensorType) -> &[LinkSensor] {
        match sensor_type {
            SensorType::SixAxisForceTorque => &[],
            SensorType::Accelerometer => &self.accelerometers,
            SensorType::Gyroscope => &self.gyroscopes,
            SensorType::ThreeAxisAngularAccelerometer => &self.angular_accelerometers,
            SensorType::ThreeAxisForceTorqueContact => &self.contacts,
        }
    }

    /// Creates a new, empty, sensor list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sensors of the given type.
    pub fn nr_of_sensors(&self, sensor_type: SensorType) -> usize {
        match sensor_type {
            SensorType::SixAxisForceTorque => self.six_axis_force_torque.len(),
            _ => self.link_sensors(sensor_type).len(),
        }
    }

    pub(crate) fn resolve_link_sensors(
        &self,
        sensor_type: SensorType,
        model: &Model,
    ) -> Result<Vec<ResolvedLinkSensor>, Error> {
        self.link_sensors(sensor_type)
            .iter()
            .map(|sensor| {
                let link = model.link_index(sensor.parent_link()).map_err(|_| {
                    Error::InconsistentSensorModel {
                        reason: format!(
                            "the {} {} is attached to the unknown link {}",
                            sensor_type,
                            sensor.name(),
                            sensor.parent_link()
                        ),
                    }
                })?;

                Ok(ResolvedLinkSensor {
                    link,
                    link_h_sensor: *sensor.link_h_sensor(),
                })
            })
            .collect()
    }

    pub(crate) fn resolve_six_axis_force_torque_sensors(
        &self,
        model: &Model,
    ) -> Result<Vec<ResolvedSixAxisSensor>, Error> {
        self.six_axis_force_torque
            .iter()
            .map(|sensor| {
                let joint = model.joint_index(sensor.parent_joint()).map_err(|_| {
                    Error::InconsistentSensorModel {
                        reason: format!(
                            "the force/torque sensor {} is mounted in the unknown joint {}",
                            sensor.name(),
                            sensor.parent_joint()
                        ),
                    }
                })?;

                let applied_link = model.link_index(sensor.applied_wrench_link()).map_err(|_| {
                    Error::InconsistentSensorModel {
                        reason: format!(
                            "the force/torque sensor {} measures the wrench on the unknown link {}",
                            sensor.name(),
                            sensor.applied_wrench_link()
                        ),
                    }
                })?;

                if !model.joint_unchecked(joint).is_attached_to(applied_link) {
                    return Err(Error::InconsistentSensorModel {
                        reason: format!(
                            "the link {} is not attached to the joint {} of the force/torque sensor {}",
                            sensor.applied_wrench_link(),
                            sensor.parent_joint(),
                            sensor.name()
                        ),
                    });
                }

                Ok(ResolvedSixAxisSensor {
                    joint,
                    applied_link,
                    link_h_sensor: *sensor.link_h_sensor(),
                })
            })
            .collect()
    }

    /// Returns the name of the sensor of the given type and index, if it exists.
    pub fn sensor_name(&self, sensor_type: SensorType, index: usize) -> Option<&str> {
        match sensor_type {
            SensorType::SixAxisForceTorque => {
                self.six_axis_force_torque.get(index).map(|s| s.name())
            }
            _ => self.link_sensors(sensor_type).get(index).map(|s| s.name()),
        }
    }

    /// Returns the six axis force/torque sensors.
    pub fn six_axis_force_torque_sensors(&self) -> &[SixAxisForceTorqueSensor] {
        &self.six_axis_force_torque
    }

    /// Returns the total number of values measured by all sensors.
    pub fn total_measurement_size(&self) -> usize {
        SensorType::ALL
            .iter()
            .map(|t| t.measurement_size() * self.nr_of_sensors(*t))
            .sum()
    }
}

/// Stores the measurements of every sensor of a [SensorsList].
#[derive(Clone, Debug, PartialEq)]
pub struct SensorsMeasurements {
    /// Per sensor type, in [SensorType::ALL] order, the measurements of each sensor.
    measurements: Vec<Vec<DVector<f64>>>,
}

impl SensorsMeasurements {
    fn check_index(&self, sensor_type: SensorType, index: usize) -> Result<(), Error> {
        if index >= self.nr_of_sensors(sensor_type) {
            return Err(Error::InconsistentSensorModel {
                reason: format!("there is no {} with index {}", sensor_type, index),
            });
        }

        Ok(())
    }

    /// Returns the measurement of the sensor with the given type and index.
    ///
    /// ## Errors
    ///
    /// * [Error::InconsistentSensorModel] - Returned when there is no such sensor.
    pub fn measurement(&self, sensor_type: SensorType, index: usize) -> Result<&DVector<f64>, Error> {
        self.check_index(sensor_type, index)?;
        Ok(&self.measurements[type_position(sensor_type)][index])
    }

    /// Creates a container with zero measurements for every sensor of the list.
    pub fn new(sensors: &SensorsList) -> Self {
        let measurements = SensorType::ALL
            .iter()
            .map(|t| vec![DVector::zeros(t.measurement_size()); sensors.nr_of_sensors(*t)])
            .collect();

        Self { measurements }
    }

    /// Returns the number of sensors of the given type.
    pub fn nr_of_sensors(&self, sensor_type: SensorType) -> usize {
        self.measurements[type_position(sensor_type)].len()
    }

    /// Sets the measurement of the sensor with the given type and index.
    ///
    /// ## Errors
    ///
    /// * [Error::InconsistentSensorModel] - Returned when there is no such sensor.
    /// * [Error::SizeMismatch] - Returned when the measurement does not have the size of the
    ///   sensor type.
    pub fn set_measurement(
        &mut self,
        sensor_type: SensorType,
        index: usize,
        value: &[f64],
    ) -> Result<(), Error> {
        self.check_index(sensor_type, index)?;
        if value.len() != sensor_type.measurement_size() {
            return Err(Error::SizeMismatch {
                what: format!("{} measurement", sensor_type),
                expected: sensor_type.measurement_size(),
                actual: value.len(),
            });
        }

        self.measurements[type_position(sensor_type)][index].copy_from_slice(value);
        Ok(())
    }

    /// Returns a value indicating whether the container holds a measurement for every sensor of
    /// the list.
    pub fn is_sized_for(&self, sensors: &SensorsList) -> bool {
        SensorType::ALL
            .iter()
            .all(|t| self.nr_of_sensors(*t) == sensors.nr_of_sensors(*t))
    }
}

fn type_position(sensor_type: SensorType) -> usize {
    sensor_type as usize
}
