use std::{collections::HashSet, fmt::Display};

use crate::Error;

#[cfg(test)]
#[path = "options_tests.rs"]
mod options_tests;

/// Defines the different formulations of the BERDY problem.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BerdyVariant {
    /// The original formulation for a model with a fixed base. The base acceleration is known
    /// from gravity and every link has explicit net wrench, joint wrench and joint torque
    /// variables.
    ///
    /// This variant is experimental.
    OriginalBerdyFixedBase,

    /// The formulation for a floating base model. The dynamic variables are the link proper
    /// accelerations, the net external wrenches, the joint wrenches and the joint accelerations.
    BerdyFloatingBase,
}

impl Display for BerdyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BerdyVariant::OriginalBerdyFixedBase => "ORIGINAL_BERDY_FIXED_BASE",
            BerdyVariant::BerdyFloatingBase => "BERDY_FLOATING_BASE",
        };
        write!(f, "{}", name)
    }
}

/// Defines the options that select the BERDY variant and which virtual sensors and dynamic
/// variables are part of the problem.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BerdyOptions {
    /// The formulation of the problem.
    pub berdy_variant: BerdyVariant,

    /// The name of the link used as the base of the traversal. When empty the default base link of
    /// the model is used.
    pub base_link: String,

    /// Adds the net external wrench of every link, for which it is a dynamic variable, as a
    /// measurement.
    pub include_all_net_external_wrenches_as_sensors: bool,

    /// Makes the net external wrench of every link a dynamic variable.
    pub include_all_net_external_wrenches_as_dynamic_variables: bool,

    /// Adds the acceleration of every degree of freedom as a measurement.
    pub include_all_joint_accelerations_as_sensors: bool,

    /// Adds the torque of every degree of freedom as a measurement.
    pub include_all_joint_torques_as_sensors: bool,

    /// Adds the net external wrench of the base link as a dynamic variable. Only valid for the
    /// fixed base variant.
    pub include_fixed_base_external_wrench: bool,

    /// The joints whose internal wrench is added as a measurement, in measurement order.
    pub joint_on_which_the_internal_wrench_is_measured: Vec<String>,
}

impl BerdyOptions {
    /// Checks that the options describe a valid problem.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidOptions] - Returned when
    ///   - the floating base variant is used without the net external wrenches as dynamic
    ///     variables,
    ///   - the net external wrenches are measured but are not dynamic variables,
    ///   - the fixed base external wrench is requested for the floating base variant,
    ///   - a joint is listed more than once in the internal wrench measurements.
    pub fn check_consistency(&self) -> Result<(), Error> {
        if self.berdy_variant == BerdyVariant::BerdyFloatingBase
            && !self.include_all_net_external_wrenches_as_dynamic_variables
        {
            return Err(Error::InvalidOptions {
                reason: format!(
                    "the {} variant requires the net external wrenches as dynamic variables",
                    self.berdy_variant
                ),
            });
        }

        if self.include_all_net_external_wrenches_as_sensors
            && !self.include_all_net_external_wrenches_as_dynamic_variables
        {
            return Err(Error::InvalidOptions {
                reason: "the net external wrenches can only be measured when they are dynamic variables"
                    .to_string(),
            });
        }

        if self.berdy_variant == BerdyVariant::BerdyFloatingBase
            && self.include_fixed_base_external_wrench
        {
            return Err(Error::InvalidOptions {
                reason: format!(
                    "the fixed base external wrench can not be used with the {} variant",
                    self.berdy_variant
                ),
            });
        }

        let mut seen = HashSet::new();
        for joint in &self.joint_on_which_the_internal_wrench_is_measured {
            if !seen.insert(joint.as_str()) {
                return Err(Error::InvalidOptions {
                    reason: format!(
                        "the internal wrench of the joint {} is measured more than once",
                        joint
                    ),
                });
            }
        }

        Ok(())
    }

    /// Creates the default options for the given variant.
    pub fn new(berdy_variant: BerdyVariant) -> Self {
        Self {
            berdy_variant,
            ..Self::default()
        }
    }

    /// Sets the base link.
    pub fn with_base_link(mut self, base_link: &str) -> Self {
        self.base_link = base_link.to_string();
        self
    }

    /// Sets whether the fixed base external wrench is a dynamic variable.
    pub fn with_fixed_base_external_wrench(mut self, include: bool) -> Self {
        self.include_fixed_base_external_wrench = include;
        self
    }

    /// Sets whether the joint accelerations are measurements.
    pub fn with_joint_accelerations_as_sensors(mut self, include: bool) -> Self {
        self.include_all_joint_accelerations_as_sensors = include;
        self
    }

    /// Sets whether the joint torques are measurements.
    pub fn with_joint_torques_as_sensors(mut self, include: bool) -> Self {
        self.include_all_joint_torques_as_sensors = include;
        self
    }

    /// Sets the joints whose internal wrench is measured.
    pub fn with_measured_joint_wrenches(mut self, joints: &[&str]) -> Self {
        self.joint_on_which_the_internal_wrench_is_measured =
            joints.iter().map(|j| j.to_string()).collect();
        self
    }

    /// Sets whether the net external wrenches are dynamic variables.
    pub fn with_net_external_wrenches_as_dynamic_variables(mut self, include: bool) -> Self {
        self.include_all_net_external_wrenches_as_dynamic_variables = include;
        self
    }

    /// Sets whether the net external wrenches are measurements.
    pub fn with_net_external_wrenches_as_sensors(mut self, include: bool) -> Self {
        self.include_all_net_external_wrenches_as_sensors = include;
        self
    }
}

impl Default for BerdyOptions {
    fn default() -> Self {
        Self {
            berdy_variant: BerdyVariant::BerdyFloatingBase,
            base_link: String::new(),
            include_all_net_external_wrenches_as_sensors: true,
            include_all_net_external_wrenches_as_dynamic_variables: true,
            include_all_joint_accelerations_as_sensors: true,
            include_all_joint_torques_as_sensors: false,
            include_fixed_base_external_wrench: false,
            joint_on_which_the_internal_wrench_is_measured: Vec::new(),
        }
    }
}
