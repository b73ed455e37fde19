use std::f64::consts::PI;

use float_cmp::{ApproxEq, F64Margin};
use nalgebra::{Isometry3, Matrix3, Translation3, UnitQuaternion, Vector3, Vector6};

use crate::spatial::motion_adjoint;

use super::*;

const MARGIN: F64Margin = F64Margin {
    ulps: 2,
    epsilon: 1e-9,
};

fn create_revolute_joint() -> Joint {
    Joint::new(
        "a".to_string(),
        JointDofType::Revolute,
        LinkIndex::new(0),
        LinkIndex::new(1),
        Isometry3::from_parts(Translation3::new(1.0, 0.0, 0.0), UnitQuaternion::identity()),
        Vector3::z_axis(),
    )
}

fn create_prismatic_joint() -> Joint {
    Joint::new(
        "b".to_string(),
        JointDofType::Prismatic,
        LinkIndex::new(2),
        LinkIndex::new(3),
        Isometry3::from_parts(
            Translation3::new(0.0, 0.5, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5 * PI),
        ),
        Vector3::x_axis(),
    )
}

fn assert_vectors_match(actual: &Vector6<f64>, expected: &Vector6<f64>) {
    for i in 0..6 {
        assert!(
            actual[i].approx_eq(expected[i], MARGIN),
            "Element {} differs. Expected {} but got {}",
            i,
            expected[i],
            actual[i]
        );
    }
}

// LinkIndex

#[test]
fn when_displaying_a_link_index_it_should_show_the_index() {
    let index = LinkIndex::new(10);
    assert_eq!(format!("{}", index), "LinkIndex [10]");
    assert_eq!(index.index(), 10);
}

#[test]
fn when_displaying_a_joint_index_it_should_show_the_index() {
    let index = JointIndex::from(3);
    assert_eq!(format!("{}", index), "JointIndex [3]");
}

// Link

#[test]
fn when_creating_a_link_it_should_store_the_properties() {
    let name = "a".to_string();
    let mass = 10.0;
    let center_of_mass = Vector3::new(1.0, 2.0, 3.0);
    let moment_of_inertia = Matrix3::new(1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0);

    let link = Link::new(name.clone(), mass, center_of_mass, moment_of_inertia);

    assert_eq!(link.name(), name);
    assert_eq!(link.mass_in_kg(), mass);
    assert_eq!(link.center_of_mass(), &center_of_mass);
    assert_eq!(link.moment_of_inertia(), &moment_of_inertia);

    let inertia = link.spatial_inertia();
    assert_eq!(inertia[(0, 0)], mass);
    assert_eq!(inertia[(1, 1)], mass);
    assert_eq!(inertia[(2, 2)], mass);

    // Parallel axis theorem: Ixx + m (cy^2 + cz^2)
    assert!(inertia[(3, 3)].approx_eq(1.0 + mass * (4.0 + 9.0), MARGIN));
}

// Joint

#[test]
fn when_creating_a_fixed_joint_it_should_have_no_dofs() {
    let joint = Joint::new_fixed(
        "f".to_string(),
        LinkIndex::new(0),
        LinkIndex::new(1),
        Isometry3::identity(),
    );

    assert_eq!(joint.degree_of_freedom_kind(), JointDofType::Fixed);
    assert_eq!(joint.nr_of_dofs(), 0);
    assert_eq!(joint.motion_subspace(1.0, LinkIndex::new(1)), Vector6::zeros());
    assert_eq!(joint.transform_to(2.0, LinkIndex::new(0)), Isometry3::identity());
}

#[test]
fn when_asking_for_the_other_link_it_should_return_the_opposite_end() {
    let joint = create_revolute_joint();

    assert_eq!(joint.other_link(LinkIndex::new(0)), Some(LinkIndex::new(1)));
    assert_eq!(joint.other_link(LinkIndex::new(1)), Some(LinkIndex::new(0)));
    assert_eq!(joint.other_link(LinkIndex::new(5)), None);

    assert!(joint.is_attached_to(LinkIndex::new(1)));
    assert!(!joint.is_attached_to(LinkIndex::new(2)));
}

#[test]
fn when_rotating_a_revolute_joint_it_should_rotate_the_second_link() {
    let joint = create_revolute_joint();

    let first_h_second = joint.transform_to(0.5 * PI, LinkIndex::new(0));

    // The x-axis of the second link points along y of the first link
    let x_axis_of_second = first_h_second * Vector3::x();
    assert!(x_axis_of_second.x.approx_eq(0.0, MARGIN));
    assert!(x_axis_of_second.y.approx_eq(1.0, MARGIN));

    // The origin of the second link stays at the rest offset
    let origin = first_h_second * nalgebra::Point3::origin();
    assert!(origin.x.approx_eq(1.0, MARGIN));
    assert!(origin.y.approx_eq(0.0, MARGIN));

    let second_h_first = joint.transform_to(0.5 * PI, LinkIndex::new(1));
    let identity = first_h_second * second_h_first;
    assert!(identity.translation.vector.norm().approx_eq(0.0, MARGIN));
    assert!(identity.rotation.angle().approx_eq(0.0, MARGIN));
}

#[test]
fn when_moving_a_prismatic_joint_it_should_translate_along_the_axis() {
    let joint = create_prismatic_joint();

    let first_h_second = joint.transform_to(2.0, LinkIndex::new(2));
    let origin = first_h_second * nalgebra::Point3::origin();

    // The x-axis of the second link is the y-axis of the first link
    assert!(origin.x.approx_eq(0.0, MARGIN));
    assert!(origin.y.approx_eq(2.5, MARGIN));
    assert!(origin.z.approx_eq(0.0, MARGIN));
}

#[test]
fn when_the_child_is_the_second_link_the_motion_subspace_should_be_the_axis() {
    let revolute = create_revolute_joint();
    assert_eq!(
        revolute.motion_subspace(0.3, LinkIndex::new(1)),
        Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0)
    );

    let prismatic = create_prismatic_joint();
    assert_eq!(
        prismatic.motion_subspace(0.3, LinkIndex::new(3)),
        Vector6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    );
}

#[test]
fn when_the_child_is_the_first_link_the_motion_subspace_should_be_the_opposite_motion() {
    let joint = create_revolute_joint();
    let position = 0.7;

    let subspace_of_first = joint.motion_subspace(position, LinkIndex::new(0));
    let subspace_of_second = joint.motion_subspace(position, LinkIndex::new(1));

    // Expressing the relative motion of the first link in the frame of the second link must
    // give the negated motion of the second link.
    let second_h_first = joint.transform_to(position, LinkIndex::new(1));
    let in_second = motion_adjoint(&second_h_first) * subspace_of_first;

    assert_vectors_match(&in_second, &(-subspace_of_second));
}

#[test]
fn when_computing_the_motion_subspace_it_should_match_the_numerical_derivative() {
    let joint = create_prismatic_joint();
    let position = 0.4;
    let step = 1e-6;

    // Origin of the first link, seen from the second link, moves with -axis
    let before = joint.transform_to(position, LinkIndex::new(3)).translation.vector;
    let after = joint
        .transform_to(position + step, LinkIndex::new(3))
        .translation
        .vector;
    let velocity_of_first_in_second = (after - before) / step;

    let subspace = joint.motion_subspace(position, LinkIndex::new(2));
    let first_h_second = joint.transform_to(position, LinkIndex::new(2));
    let expected = first_h_second.rotation * velocity_of_first_in_second;

    for i in 0..3 {
        assert!(
            (subspace[i] - expected[i]).abs() < 1e-6,
            "Element {} differs. Expected {} but got {}",
            i,
            expected[i],
            subspace[i]
        );
    }
}
