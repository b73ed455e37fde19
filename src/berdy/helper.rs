extern crate nalgebra as na;

use na::{DVector, Vector3};
use nalgebra_sparse::CscMatrix;
use tracing::{debug, warn};

use crate::{
    model_elements::{
        frame_elements::LinkIndex,
        model::{DynamicTraversal, Model},
    },
    sensors::sensor_elements::{SensorsList, SensorsMeasurements},
    spatial::{SpatialAcc, Wrench},
    Error,
};

use super::{
    dynamics_matrices::{strategy_for, AssemblyContext},
    kinematics::BerdyKinematics,
    options::{BerdyOptions, BerdyVariant},
    sensor_matrices::sensor_matrices,
    serialization,
    variables::{
        sensors_layout, BerdyDynamicVariable, BerdyDynamicVariablesTypes, BerdySensor,
        DynamicVariablesLayout, SensorsLayout,
    },
};

#[cfg(test)]
#[path = "helper_tests.rs"]
mod helper_tests;

/// The matrices of the BERDY problem
///
/// ```text
/// D * d + bD = 0
/// Y * d + bY = y
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BerdyMatrices {
    /// The coefficients of the dynamic variables in the dynamics constraints.
    pub d: CscMatrix<f64>,
    /// The constant part of the dynamics constraints.
    pub bd: DVector<f64>,
    /// The coefficients of the dynamic variables in the measurement equations.
    pub y: CscMatrix<f64>,
    /// The constant part of the measurement equations.
    pub by: DVector<f64>,
}

#[derive(Clone, Debug)]
struct ReadyState {
    model: Model,
    sensors: SensorsList,
    options: BerdyOptions,
    traversal: DynamicTraversal,
    variables: DynamicVariablesLayout,
    sensors_layout: SensorsLayout,
    nr_of_dynamic_equations: usize,
    kinematics: BerdyKinematics,
}

impl ReadyState {
    fn context(&self) -> AssemblyContext<'_> {
        AssemblyContext {
            model: &self.model,
            traversal: &self.traversal,
            options: &self.options,
            variables: &self.variables,
            kinematics: &self.kinematics,
        }
    }
}

/// Builds the BERDY estimation problem for a model and a set of sensors.
///
/// The helper starts uninitialized. A successful call to [BerdyHelper::init] computes the
/// traversal and the variable orderings and makes the helper ready. The kinematic state used as
/// coefficients of the matrices is updated with [BerdyHelper::update_kinematics_from_fixed_base]
/// or [BerdyHelper::update_kinematics_from_floating_base].
#[derive(Clone, Debug, Default)]
pub struct BerdyHelper {
    state: Option<ReadyState>,
}

impl BerdyHelper {
    fn ready(&self) -> Result<&ReadyState, Error> {
        self.state.as_ref().ok_or(Error::NotInitialized)
    }

    fn ready_mut(&mut self) -> Result<&mut ReadyState, Error> {
        self.state.as_mut().ok_or(Error::NotInitialized)
    }

    /// Computes the matrices `D`, `bD`, `Y` and `bY` for the current kinematic state.
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    pub fn berdy_matrices(&self) -> Result<BerdyMatrices, Error> {
        let state = self.ready()?;
        let strategy = strategy_for(state.options.berdy_variant);
        let context = state.context();

        let (d, bd) = strategy.dynamics_matrices(&context);
        let (y, by) = sensor_matrices(&context, strategy, &state.sensors_layout);

        Ok(BerdyMatrices { d, bd, y, by })
    }

    /// Returns the traversal used to order the dynamic variables.
    pub fn dynamic_traversal(&self) -> Result<&DynamicTraversal, Error> {
        Ok(&self.ready()?.traversal)
    }

    /// Returns the dynamic variables in the order in which they appear in `d`.
    pub fn dynamic_variables_ordering(&self) -> Result<&[BerdyDynamicVariable], Error> {
        Ok(self.ready()?.variables.ordering())
    }

    /// Reads the value of a single dynamic variable from `d`.
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    /// * [Error::SizeMismatch] - Returned when `d` does not have [BerdyHelper::nr_of_dynamic_variables]
    ///   elements.
    /// * [Error::MissingDynamicVariable] - Returned when there is no such variable.
    pub fn extract_dynamic_variable(
        &self,
        d: &DVector<f64>,
        variable_type: BerdyDynamicVariablesTypes,
        id: &str,
    ) -> Result<DVector<f64>, Error> {
        serialization::extract_dynamic_variable(&self.ready()?.variables, d, variable_type, id)
    }

    /// Initializes the helper for the given model, sensors and options.
    ///
    /// On failure the helper is left uninitialized.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidOptions] - Returned when the options are not consistent or the base link
    ///   does not exist.
    /// * [Error::InconsistentSensorModel] - Returned when the sensors do not match the model or the
    ///   options.
    /// * [Error::DisconnectedModel] - Returned when not every link is connected to the base link.
    pub fn init(
        &mut self,
        model: Model,
        sensors: SensorsList,
        options: BerdyOptions,
    ) -> Result<(), Error> {
        self.state = None;

        options.check_consistency()?;
        sensors.check_consistency(&model)?;

        let base = if options.base_link.is_empty() {
            model.default_base_link().map_err(|_| Error::InvalidOptions {
                reason: "the model has no links".to_string(),
            })?
        } else {
            model
                .link_index(&options.base_link)
                .map_err(|_| Error::InvalidOptions {
                    reason: format!("the base link {} is not part of the model", options.base_link),
                })?
        };

        let traversal = model.compute_full_tree_traversal(base)?;
        let strategy = strategy_for(options.berdy_variant);
        let variables = strategy.dynamic_variables(&model, &traversal, &options);
        let nr_of_dynamic_equations = strategy.nr_of_dynamic_equations(&model, &traversal, &options);
        let sensors_layout = sensors_layout(&model, &sensors, &options, &variables)?;
        let kinematics = BerdyKinematics::zero(&model, &traversal);

        log_initialization(&options, &model, &variables, &sensors_layout, nr_of_dynamic_equations);

        self.state = Some(ReadyState {
            model,
            sensors,
            options,
            traversal,
            variables,
            sensors_layout,
            nr_of_dynamic_equations,
            kinematics,
        });
        Ok(())
    }

    /// Returns a value indicating whether [BerdyHelper::init] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the model.
    pub fn model(&self) -> Result<&Model, Error> {
        Ok(&self.ready()?.model)
    }

    /// Creates an uninitialized helper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows of `D`, or zero when the helper is not initialized.
    pub fn nr_of_dynamic_equations(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |state| state.nr_of_dynamic_equations)
    }

    /// Returns the number of elements of `d`, or zero when the helper is not initialized.
    pub fn nr_of_dynamic_variables(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |state| state.variables.size())
    }

    /// Returns the number of elements of `y`, or zero when the helper is not initialized.
    pub fn nr_of_sensors_measurements(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |state| state.sensors_layout.size())
    }

    /// Returns the options the helper was initialized with.
    pub fn options(&self) -> Result<&BerdyOptions, Error> {
        Ok(&self.ready()?.options)
    }

    /// Returns the sensors.
    pub fn sensors(&self) -> Result<&SensorsList, Error> {
        Ok(&self.ready()?.sensors)
    }

    /// Returns the measurements in the order in which they appear in `y`.
    pub fn sensors_ordering(&self) -> Result<&[BerdySensor], Error> {
        Ok(self.ready()?.sensors_layout.ordering())
    }

    /// Packs the dynamic variables into `d`.
    ///
    /// ## Parameters
    ///
    /// * 'link_proper_accelerations' - The proper acceleration of every link, by link index
    /// * 'link_net_wrenches_without_gravity' - The net wrench `I a + v ×* I v` of every link
    /// * 'external_wrenches' - The net external wrench of every link
    /// * 'internal_wrenches' - Per link the wrench that its traversal parent applies on it
    /// * 'joint_torques' - The torque of every degree of freedom
    /// * 'joint_accelerations' - The acceleration of every degree of freedom
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    /// * [Error::SizeMismatch] - Returned when one of the buffers is not sized for the model.
    pub fn serialize_dynamic_variables(
        &self,
        link_proper_accelerations: &[SpatialAcc],
        link_net_wrenches_without_gravity: &[Wrench],
        external_wrenches: &[Wrench],
        internal_wrenches: &[Wrench],
        joint_torques: &DVector<f64>,
        joint_accelerations: &DVector<f64>,
    ) -> Result<DVector<f64>, Error> {
        let state = self.ready()?;
        serialization::serialize_dynamic_variables(
            &state.model,
            &state.traversal,
            &state.variables,
            link_proper_accelerations,
            link_net_wrenches_without_gravity,
            external_wrenches,
            internal_wrenches,
            joint_torques,
            joint_accelerations,
        )
    }

    /// Packs the measurements of the physical and the virtual sensors into `y`.
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    /// * [Error::SizeMismatch] - Returned when one of the buffers is not sized for the model or the
    ///   measurements do not match the sensors.
    pub fn serialize_sensor_variables(
        &self,
        measurements: &SensorsMeasurements,
        external_wrenches: &[Wrench],
        joint_torques: &DVector<f64>,
        joint_accelerations: &DVector<f64>,
        internal_wrenches: &[Wrench],
    ) -> Result<DVector<f64>, Error> {
        let state = self.ready()?;
        serialization::serialize_sensor_variables(
            &state.model,
            &state.traversal,
            &state.sensors,
            &state.sensors_layout,
            measurements,
            external_wrenches,
            joint_torques,
            joint_accelerations,
            internal_wrenches,
        )
    }

    /// Updates the kinematic state for a model whose base is fixed.
    ///
    /// ## Parameters
    ///
    /// * 'joint_positions' - The joint displacements
    /// * 'joint_velocities' - The joint velocities
    /// * 'fixed_frame' - The fixed link. Must be the base link of the traversal
    /// * 'gravity' - The gravity acceleration, expressed in the fixed frame
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    /// * [Error::FixedFrameIsNotBase] - Returned when the fixed frame is not the traversal base.
    /// * [Error::SizeMismatch] - Returned when the joint buffers are not sized for the model.
    pub fn update_kinematics_from_fixed_base(
        &mut self,
        joint_positions: &DVector<f64>,
        joint_velocities: &DVector<f64>,
        fixed_frame: LinkIndex,
        gravity: &Vector3<f64>,
    ) -> Result<(), Error> {
        let state = self.ready_mut()?;
        let base = state.traversal.base_link();
        if fixed_frame != base {
            return Err(Error::FixedFrameIsNotBase {
                frame: fixed_frame,
                base,
            });
        }

        state.kinematics = BerdyKinematics::from_fixed_base(
            &state.model,
            &state.traversal,
            joint_positions,
            joint_velocities,
            gravity,
        )?;
        Ok(())
    }

    /// Updates the kinematic state for a floating model, given the angular velocity of one of
    /// its links. The linear velocity of the base is assumed to be zero.
    ///
    /// ## Parameters
    ///
    /// * 'joint_positions' - The joint displacements
    /// * 'joint_velocities' - The joint velocities
    /// * 'floating_frame' - The link whose angular velocity is known
    /// * 'angular_velocity' - The angular velocity of the floating frame, expressed in the
    ///   floating frame
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    /// * [Error::InvalidLinkIndex] - Returned when the floating frame is not a link of the model.
    /// * [Error::SizeMismatch] - Returned when the joint buffers are not sized for the model.
    pub fn update_kinematics_from_floating_base(
        &mut self,
        joint_positions: &DVector<f64>,
        joint_velocities: &DVector<f64>,
        floating_frame: LinkIndex,
        angular_velocity: &Vector3<f64>,
    ) -> Result<(), Error> {
        let state = self.ready_mut()?;
        state.kinematics = BerdyKinematics::from_floating_base(
            &state.model,
            &state.traversal,
            joint_positions,
            joint_velocities,
            floating_frame,
            angular_velocity,
        )?;
        Ok(())
    }
}

#[cfg_attr(test, mutants::skip)] // Only logs
fn log_initialization(
    options: &BerdyOptions,
    model: &Model,
    variables: &DynamicVariablesLayout,
    sensors_layout: &SensorsLayout,
    nr_of_dynamic_equations: usize,
) {
    if options.berdy_variant == BerdyVariant::OriginalBerdyFixedBase {
        warn!(
            "The {} variant is experimental",
            BerdyVariant::OriginalBerdyFixedBase
        );
    }

    debug!(
        variant = %options.berdy_variant,
        links = model.nr_of_links(),
        dofs = model.nr_of_dofs(),
        dynamic_variables = variables.size(),
        dynamic_equations = nr_of_dynamic_equations,
        measurements = sensors_layout.size(),
        "Initialized the BERDY helper"
    );
}
