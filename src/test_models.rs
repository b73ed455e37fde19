//! Models, sensors and random states shared by the unit tests.

use float_cmp::{ApproxEq, F64Margin};
use nalgebra::{DVector, Isometry3, Matrix3, Translation3, Unit, UnitQuaternion, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dynamics::state::{FreeFloatingAcc, FreeFloatingPos, FreeFloatingVel},
    model_elements::{
        frame_elements::{Joint, JointDofType, Link},
        model::Model,
    },
    sensors::sensor_elements::{LinkSensor, SensorsList, SixAxisForceTorqueSensor},
    spatial::{from_parts, Wrench},
};

pub(crate) fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn random_vector3(rng: &mut StdRng) -> Vector3<f64> {
    Vector3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    )
}

fn random_transform(rng: &mut StdRng) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(random_vector3(rng)),
        UnitQuaternion::from_euler_angles(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-3.0..3.0),
        ),
    )
}

fn create_link(name: &str, mass: f64, center_of_mass: Vector3<f64>) -> Link {
    let inertia = Matrix3::new(
        0.02 * mass,
        0.001,
        -0.002,
        0.001,
        0.03 * mass,
        0.003,
        -0.002,
        0.003,
        0.025 * mass,
    );
    Link::new(name.to_string(), mass, center_of_mass, inertia)
}

fn create_joint(
    name: &str,
    kind: JointDofType,
    first: &str,
    second: &str,
    rest: Isometry3<f64>,
    axis: Vector3<f64>,
    model: &Model,
) -> Joint {
    Joint::new(
        name.to_string(),
        kind,
        model.link_index(first).unwrap(),
        model.link_index(second).unwrap(),
        rest,
        Unit::new_normalize(axis),
    )
}

/// Creates a serial chain of revolute joints with varying axes and offsets.
pub(crate) fn create_chain_model(nr_of_links: usize) -> Model {
    let mut model = Model::new();
    for i in 0..nr_of_links {
        let com = Vector3::new(0.05 * i as f64, -0.02, 0.15);
        model
            .add_link(create_link(&format!("link{}", i), 1.0 + 0.5 * i as f64, com))
            .unwrap();
    }

    let axes = [Vector3::z(), Vector3::y(), Vector3::x(), Vector3::new(0.3, 1.0, -0.2)];
    for i in 1..nr_of_links {
        let joint = create_joint(
            &format!("joint{}", i),
            JointDofType::Revolute,
            &format!("link{}", i - 1),
            &format!("link{}", i),
            Isometry3::from_parts(
                Translation3::new(0.02, 0.01 * i as f64, 0.3),
                UnitQuaternion::from_euler_angles(0.1 * i as f64, -0.2, 0.05),
            ),
            axes[i % axes.len()],
            &model,
        );
        model.add_joint(joint).unwrap();
    }

    model
}

/// Creates the tree
///
/// ```text
///           base
///             |  revolute
///           torso
///  revolute /     \ revolute, reversed
///        arm       head
///  prismatic, |      | fixed
///  reversed   |      |
///        slider    camera
/// ```
///
/// Reversed joints have the link farther away from `base` as their first link.
pub(crate) fn create_tree_model() -> Model {
    let mut model = Model::new();
    model
        .add_link(create_link("base", 5.0, Vector3::new(0.0, 0.0, 0.05)))
        .unwrap();
    model
        .add_link(create_link("torso", 3.0, Vector3::new(0.01, 0.02, 0.2)))
        .unwrap();
    model
        .add_link(create_link("arm", 1.5, Vector3::new(0.15, 0.0, -0.01)))
        .unwrap();
    model
        .add_link(create_link("slider", 0.5, Vector3::new(-0.03, 0.04, 0.0)))
        .unwrap();
    model
        .add_link(create_link("head", 1.0, Vector3::new(0.0, 0.05, 0.08)))
        .unwrap();
    model
        .add_link(create_link("camera", 0.2, Vector3::new(0.02, 0.0, 0.01)))
        .unwrap();

    let joints = [
        create_joint(
            "base_torso",
            JointDofType::Revolute,
            "base",
            "torso",
            Isometry3::from_parts(
                Translation3::new(0.0, 0.0, 0.3),
                UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
            ),
            Vector3::z(),
            &model,
        ),
        create_joint(
            "torso_arm",
            JointDofType::Revolute,
            "torso",
            "arm",
            Isometry3::from_parts(
                Translation3::new(0.2, 0.0, 0.4),
                UnitQuaternion::from_euler_angles(-0.4, 0.0, 0.7),
            ),
            Vector3::new(1.0, 1.0, 0.0),
            &model,
        ),
        create_joint(
            "slider_arm",
            JointDofType::Prismatic,
            "slider",
            "arm",
            Isometry3::from_parts(
                Translation3::new(-0.3, 0.05, 0.0),
                UnitQuaternion::from_euler_angles(0.0, 0.3, -0.2),
            ),
            Vector3::x(),
            &model,
        ),
        create_joint(
            "head_torso",
            JointDofType::Revolute,
            "head",
            "torso",
            Isometry3::from_parts(
                Translation3::new(0.0, -0.1, -0.45),
                UnitQuaternion::from_euler_angles(0.2, -0.1, 0.0),
            ),
            Vector3::y(),
            &model,
        ),
        create_joint(
            "head_camera",
            JointDofType::Fixed,
            "head",
            "camera",
            Isometry3::from_parts(
                Translation3::new(0.1, 0.0, 0.05),
                UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5),
            ),
            Vector3::z(),
            &model,
        ),
    ];

    for joint in joints {
        model.add_joint(joint).unwrap();
    }

    model
}

/// Creates a model with a single link and no joints.
pub(crate) fn create_single_link_model() -> Model {
    let mut model = Model::new();
    model
        .add_link(create_link("body", 2.0, Vector3::new(0.1, 0.0, -0.05)))
        .unwrap();
    model
}

/// Creates one sensor of every type for the tree model, including a force/torque sensor that
/// measures the wrench on the parent link of its joint.
pub(crate) fn create_tree_sensors(rng: &mut StdRng) -> SensorsList {
    let mut sensors = SensorsList::new();
    sensors
        .add_six_axis_force_torque_sensor(SixAxisForceTorqueSensor::new(
            "arm_ft".to_string(),
            "torso_arm".to_string(),
            "arm".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_six_axis_force_torque_sensor(SixAxisForceTorqueSensor::new(
            "slider_ft".to_string(),
            "slider_arm".to_string(),
            "arm".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_six_axis_force_torque_sensor(SixAxisForceTorqueSensor::new(
            "head_ft".to_string(),
            "head_torso".to_string(),
            "head".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_accelerometer(LinkSensor::new(
            "torso_acc".to_string(),
            "torso".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_accelerometer(LinkSensor::new(
            "camera_acc".to_string(),
            "camera".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_gyroscope(LinkSensor::new(
            "slider_gyro".to_string(),
            "slider".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_three_axis_angular_accelerometer(LinkSensor::new(
            "arm_angular_acc".to_string(),
            "arm".to_string(),
            random_transform(rng),
        ))
        .unwrap();
    sensors
        .add_three_axis_force_torque_contact_sensor(LinkSensor::new(
            "slider_contact".to_string(),
            "slider".to_string(),
            random_transform(rng),
        ))
        .unwrap();

    sensors
}

/// Creates accelerometers and gyroscopes on every link of a model, using the link names.
pub(crate) fn create_imu_sensors(model: &Model, rng: &mut StdRng) -> SensorsList {
    let mut sensors = SensorsList::new();
    for link in model.links() {
        sensors
            .add_accelerometer(LinkSensor::new(
                format!("{}_acc", link.name()),
                link.name().to_string(),
                random_transform(rng),
            ))
            .unwrap();
        sensors
            .add_gyroscope(LinkSensor::new(
                format!("{}_gyro", link.name()),
                link.name().to_string(),
                random_transform(rng),
            ))
            .unwrap();
    }

    sensors
}

/// Creates a random position, velocity and acceleration for the model. The base has a zero linear
/// velocity.
pub(crate) fn create_random_state(
    model: &Model,
    rng: &mut StdRng,
) -> (FreeFloatingPos, FreeFloatingVel, FreeFloatingAcc) {
    let mut pos = FreeFloatingPos::new(model);
    let mut vel = FreeFloatingVel::new(model);
    let mut acc = FreeFloatingAcc::new(model);

    pos.world_h_base = random_transform(rng);
    vel.base_twist = from_parts(&Vector3::zeros(), &random_vector3(rng));
    acc.base_proper_acceleration = from_parts(&random_vector3(rng), &random_vector3(rng));

    let nr_of_dofs = model.nr_of_dofs();
    pos.joint_positions = DVector::from_fn(nr_of_dofs, |_, _| rng.gen_range(-1.5..1.5));
    vel.joint_velocities = DVector::from_fn(nr_of_dofs, |_, _| rng.gen_range(-1.0..1.0));
    acc.joint_accelerations = DVector::from_fn(nr_of_dofs, |_, _| rng.gen_range(-1.0..1.0));

    (pos, vel, acc)
}

pub(crate) fn create_random_wrenches(nr_of_links: usize, rng: &mut StdRng) -> Vec<Wrench> {
    (0..nr_of_links)
        .map(|_| from_parts(&random_vector3(rng), &random_vector3(rng)))
        .collect()
}

/// Asserts that two slices are equal to within the given absolute tolerance.
pub(crate) fn assert_slices_match(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "The slices differ in length");

    let margin = F64Margin { ulps: 4, epsilon };
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.approx_eq(*e, margin),
            "Element {} differs. Expected {} but got {}",
            i,
            e,
            a
        );
    }
}
