use crate::Error;

use super::{BerdyOptions, BerdyVariant};

fn assert_invalid(options: &BerdyOptions) {
    match options.check_consistency() {
        Err(Error::InvalidOptions { reason: _ }) => {}
        r => assert!(false, "Expected invalid options. Got {:?}", r),
    }
}

#[test]
fn when_using_the_default_options_they_should_be_consistent() {
    let options = BerdyOptions::default();

    assert_eq!(options.berdy_variant, BerdyVariant::BerdyFloatingBase);
    assert!(options.include_all_net_external_wrenches_as_dynamic_variables);
    assert!(options.include_all_net_external_wrenches_as_sensors);
    assert!(options.include_all_joint_accelerations_as_sensors);
    assert!(!options.include_all_joint_torques_as_sensors);
    assert!(!options.include_fixed_base_external_wrench);
    assert!(options.base_link.is_empty());
    assert_eq!(options.check_consistency(), Ok(()));
}

#[test]
fn when_creating_options_for_the_fixed_base_they_should_be_consistent() {
    let options = BerdyOptions::new(BerdyVariant::OriginalBerdyFixedBase)
        .with_fixed_base_external_wrench(true)
        .with_joint_torques_as_sensors(true)
        .with_measured_joint_wrenches(&["a", "b"])
        .with_base_link("base");

    assert_eq!(options.berdy_variant, BerdyVariant::OriginalBerdyFixedBase);
    assert_eq!(
        options.joint_on_which_the_internal_wrench_is_measured,
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(options.base_link, "base");
    assert_eq!(options.check_consistency(), Ok(()));
}

#[test]
fn when_the_floating_base_has_no_external_wrench_variables_it_should_be_invalid() {
    let options = BerdyOptions::default()
        .with_net_external_wrenches_as_sensors(false)
        .with_net_external_wrenches_as_dynamic_variables(false);

    assert_invalid(&options);
}

#[test]
fn when_measuring_external_wrenches_that_are_not_variables_it_should_be_invalid() {
    let options = BerdyOptions::new(BerdyVariant::OriginalBerdyFixedBase)
        .with_net_external_wrenches_as_dynamic_variables(false)
        .with_net_external_wrenches_as_sensors(true);

    assert_invalid(&options);

    let valid = options.with_net_external_wrenches_as_sensors(false);
    assert_eq!(valid.check_consistency(), Ok(()));
}

#[test]
fn when_the_floating_base_includes_the_fixed_base_wrench_it_should_be_invalid() {
    let options = BerdyOptions::default().with_fixed_base_external_wrench(true);

    assert_invalid(&options);
}

#[test]
fn when_a_joint_wrench_is_measured_twice_it_should_be_invalid() {
    let options = BerdyOptions::default().with_measured_joint_wrenches(&["a", "b", "a"]);

    assert_invalid(&options);
}

#[test]
fn when_displaying_a_variant_it_should_use_the_variant_name() {
    assert_eq!(
        format!("{}", BerdyVariant::OriginalBerdyFixedBase),
        "ORIGINAL_BERDY_FIXED_BASE"
    );
    assert_eq!(
        format!("{}", BerdyVariant::BerdyFloatingBase),
        "BERDY_FLOATING_BASE"
    );
}
