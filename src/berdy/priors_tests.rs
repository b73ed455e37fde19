use crate::{
    berdy::{helper::BerdyHelper, options::BerdyOptions},
    sensors::sensor_elements::SensorsList,
    test_models::{create_chain_model, create_imu_sensors, create_rng},
    Error,
};

use super::BerdyPriors;

#[test]
fn when_creating_priors_for_an_uninitialized_helper_it_should_fail() {
    let helper = BerdyHelper::new();

    let result = BerdyPriors::new(&helper);

    assert_eq!(result, Err(Error::NotInitialized));
}

#[test]
fn when_creating_priors_they_should_be_sized_for_the_problem() {
    let model = create_chain_model(3);
    let mut rng = create_rng(11);
    let sensors = create_imu_sensors(&model, &mut rng);

    let mut helper = BerdyHelper::new();
    helper
        .init(model, sensors, BerdyOptions::default())
        .unwrap();

    let priors = BerdyPriors::new(&helper).unwrap();

    let nr_of_variables = helper.nr_of_dynamic_variables();
    assert_eq!(
        priors.dynamics_regularization_expected_value.len(),
        nr_of_variables
    );
    assert!(priors
        .dynamics_regularization_expected_value
        .iter()
        .all(|v| *v == 0.0));
    assert_eq!(priors.dynamics_regularization_covariance.nrows(), nr_of_variables);
    assert_eq!(priors.dynamics_regularization_covariance.nnz(), nr_of_variables);

    assert_eq!(
        priors.dynamics_constraints_covariance.ncols(),
        helper.nr_of_dynamic_equations()
    );
    assert_eq!(
        priors.measurements_covariance.nnz(),
        helper.nr_of_sensors_measurements()
    );
}

#[test]
fn when_creating_priors_without_sensors_the_measurement_covariance_should_be_empty() {
    let mut helper = BerdyHelper::new();
    helper
        .init(
            create_chain_model(2),
            SensorsList::new(),
            BerdyOptions::default()
                .with_joint_accelerations_as_sensors(false)
                .with_net_external_wrenches_as_sensors(false),
        )
        .unwrap();

    let priors = BerdyPriors::new(&helper).unwrap();

    assert_eq!(priors.measurements_covariance.nrows(), 0);
    assert_eq!(priors.measurements_covariance.nnz(), 0);
}
