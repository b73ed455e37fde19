extern crate nalgebra as na;

use na::DVector;
use nalgebra_sparse::CscMatrix;

use crate::Error;

use super::{helper::BerdyHelper, sparse::set_diagonal_matrix};

#[cfg(test)]
#[path = "priors_tests.rs"]
mod priors_tests;

/// The prior distributions of a BERDY maximum a posteriori estimation.
///
/// Every covariance starts as an identity matrix and every expected value as zero.
#[derive(Clone, Debug, PartialEq)]
pub struct BerdyPriors {
    /// The expected value of the dynamic variables, `mu_d`.
    pub dynamics_regularization_expected_value: DVector<f64>,

    /// The covariance of the dynamic variables, `sigma_d`.
    pub dynamics_regularization_covariance: CscMatrix<f64>,

    /// The covariance of the dynamics constraints, `sigma_D`.
    pub dynamics_constraints_covariance: CscMatrix<f64>,

    /// The covariance of the measurements, `sigma_y`.
    pub measurements_covariance: CscMatrix<f64>,
}

impl BerdyPriors {
    /// Creates the priors sized for an initialized helper.
    ///
    /// ## Errors
    ///
    /// * [Error::NotInitialized] - Returned when the helper has not been initialized.
    pub fn new(helper: &BerdyHelper) -> Result<Self, Error> {
        if !helper.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let nr_of_dynamic_variables = helper.nr_of_dynamic_variables();
        Ok(Self {
            dynamics_regularization_expected_value: DVector::zeros(nr_of_dynamic_variables),
            dynamics_regularization_covariance: set_diagonal_matrix(nr_of_dynamic_variables, 1.0),
            dynamics_constraints_covariance: set_diagonal_matrix(
                helper.nr_of_dynamic_equations(),
                1.0,
            ),
            measurements_covariance: set_diagonal_matrix(helper.nr_of_sensors_measurements(), 1.0),
        })
    }
}
