use nalgebra::{DVector, Vector3};

use crate::{
    dynamics::oracle::{DynamicsOracle, RecursiveNewtonEuler},
    model_elements::model::Model,
    spatial::{angular, from_parts},
    test_models::{
        assert_slices_match, create_random_state, create_rng, create_tree_model,
    },
    Error,
};

use super::BerdyKinematics;

fn base_traversal(model: &Model) -> crate::model_elements::model::DynamicTraversal {
    model
        .compute_full_tree_traversal(model.default_base_link().unwrap())
        .unwrap()
}

#[test]
fn when_computing_a_fixed_base_the_base_should_carry_the_gravity() {
    let model = create_tree_model();
    let traversal = base_traversal(&model);
    let q = DVector::zeros(model.nr_of_dofs());

    let kinematics = BerdyKinematics::from_fixed_base(
        &model,
        &traversal,
        &q,
        &q,
        &Vector3::new(0.0, 0.0, -9.81),
    )
    .unwrap();

    assert_eq!(
        kinematics.base_proper_acceleration,
        from_parts(&Vector3::new(0.0, 0.0, 9.81), &Vector3::zeros())
    );
    assert!(kinematics.twists.iter().all(|t| t.norm() == 0.0));
}

#[test]
fn when_computing_from_a_floating_frame_the_twists_should_match_the_forward_kinematics() {
    let model = create_tree_model();
    let traversal = base_traversal(&model);
    let mut rng = create_rng(21);
    let (pos, vel, acc) = create_random_state(&model, &mut rng);
    let expected = RecursiveNewtonEuler
        .compute_link_kinematics(&model, &traversal, &pos, &vel, &acc)
        .unwrap();

    let slider = model.link_index("slider").unwrap();
    let kinematics = BerdyKinematics::from_floating_base(
        &model,
        &traversal,
        &pos.joint_positions,
        &vel.joint_velocities,
        slider,
        &angular(&expected.twists[slider.index()]),
    )
    .unwrap();

    for (actual, expected) in kinematics.twists.iter().zip(expected.twists.iter()) {
        assert_slices_match(actual.as_slice(), expected.as_slice(), 1e-12);
    }
}

#[test]
fn when_the_joint_buffers_have_the_wrong_size_it_should_fail() {
    let model = create_tree_model();
    let traversal = base_traversal(&model);
    let q = DVector::zeros(model.nr_of_dofs());
    let dq = DVector::zeros(1);

    let result =
        BerdyKinematics::from_fixed_base(&model, &traversal, &q, &dq, &Vector3::zeros());

    assert_eq!(
        result,
        Err(Error::SizeMismatch {
            what: "joint velocities".to_string(),
            expected: model.nr_of_dofs(),
            actual: 1,
        })
    );
}
