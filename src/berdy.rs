/// Defines the options that select the BERDY variant and the virtual sensors.
pub mod options;

/// Defines the dynamic variables, the measurements and their ordering.
pub mod variables;

/// Defines the helper that owns a BERDY problem and computes its matrices.
pub mod helper;

/// Defines the prior distributions of the estimation problem.
pub mod priors;

/// Provides helpers for sparse matrices.
pub mod sparse;

mod dynamics_matrices;
mod kinematics;
mod sensor_matrices;
mod serialization;

pub use helper::{BerdyHelper, BerdyMatrices};
pub use options::{BerdyOptions, BerdyVariant};
pub use priors::BerdyPriors;
pub use variables::{
    BerdyDynamicVariable, BerdyDynamicVariablesTypes, BerdySensor, BerdySensorTypes, IndexRange,
};
