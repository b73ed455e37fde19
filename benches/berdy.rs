use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{DVector, Isometry3, Matrix3, Translation3, UnitQuaternion, Vector3};
use berdy_estimation::{
    berdy::{BerdyHelper, BerdyOptions, BerdyVariant},
    model_elements::{
        frame_elements::{Joint, JointDofType, Link, LinkIndex},
        model::Model,
    },
    sensors::sensor_elements::{LinkSensor, SensorsList},
    spatial::{SpatialAcc, Wrench},
};

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets =
        berdy_helper_init,
        berdy_helper_berdy_matrices_floating_base,
        berdy_helper_berdy_matrices_fixed_base,
        berdy_helper_serialize_dynamic_variables,
        berdy_helper_update_kinematics_from_floating_base,
}

criterion_main!(benches);

pub fn berdy_helper_init(c: &mut Criterion) {
    let model = create_chain_model(20);
    let sensors = create_sensors(&model);

    c.bench_function("BerdyHelper::init", |b| {
        b.iter(|| {
            let mut helper = BerdyHelper::new();
            helper.init(
                black_box(model.clone()),
                black_box(sensors.clone()),
                BerdyOptions::default(),
            )
        });
    });
}

pub fn berdy_helper_berdy_matrices_fixed_base(c: &mut Criterion) {
    let model = create_chain_model(20);
    let mut helper = BerdyHelper::new();
    helper
        .init(
            model.clone(),
            create_sensors(&model),
            BerdyOptions::new(BerdyVariant::OriginalBerdyFixedBase)
                .with_fixed_base_external_wrench(true),
        )
        .unwrap();

    let q = DVector::from_element(model.nr_of_dofs(), 0.3);
    helper
        .update_kinematics_from_fixed_base(&q, &q, LinkIndex::new(0), &Vector3::new(0.0, 0.0, -9.81))
        .unwrap();

    c.bench_function("BerdyHelper::berdy_matrices (fixed base)", |b| {
        b.iter(|| black_box(&helper).berdy_matrices());
    });
}

pub fn berdy_helper_berdy_matrices_floating_base(c: &mut Criterion) {
    let model = create_chain_model(20);
    let mut helper = BerdyHelper::new();
    helper
        .init(model.clone(), create_sensors(&model), BerdyOptions::default())
        .unwrap();

    let q = DVector::from_element(model.nr_of_dofs(), 0.3);
    helper
        .update_kinematics_from_floating_base(&q, &q, LinkIndex::new(0), &Vector3::new(0.1, 0.2, 0.3))
        .unwrap();

    c.bench_function("BerdyHelper::berdy_matrices (floating base)", |b| {
        b.iter(|| black_box(&helper).berdy_matrices());
    });
}

pub fn berdy_helper_serialize_dynamic_variables(c: &mut Criterion) {
    let model = create_chain_model(20);
    let mut helper = BerdyHelper::new();
    helper
        .init(model.clone(), create_sensors(&model), BerdyOptions::default())
        .unwrap();

    let accelerations = vec![SpatialAcc::from_element(0.5); model.nr_of_links()];
    let wrenches = vec![Wrench::from_element(1.5); model.nr_of_links()];
    let joint_values = DVector::from_element(model.nr_of_dofs(), 0.7);

    c.bench_function("BerdyHelper::serialize_dynamic_variables", |b| {
        b.iter(|| {
            helper.serialize_dynamic_variables(
                black_box(&accelerations),
                black_box(&wrenches),
                black_box(&wrenches),
                black_box(&wrenches),
                black_box(&joint_values),
                black_box(&joint_values),
            )
        });
    });
}

pub fn berdy_helper_update_kinematics_from_floating_base(c: &mut Criterion) {
    let model = create_chain_model(20);
    let mut helper = BerdyHelper::new();
    helper
        .init(model.clone(), create_sensors(&model), BerdyOptions::default())
        .unwrap();

    let q = DVector::from_element(model.nr_of_dofs(), 0.3);
    let floating_frame = LinkIndex::new(10);
    let angular_velocity = Vector3::new(0.1, -0.2, 0.3);

    c.bench_function("BerdyHelper::update_kinematics_from_floating_base", |b| {
        b.iter(|| {
            helper.update_kinematics_from_floating_base(
                black_box(&q),
                black_box(&q),
                floating_frame,
                black_box(&angular_velocity),
            )
        });
    });
}

fn create_chain_model(nr_of_links: usize) -> Model {
    let mut model = Model::new();
    for i in 0..nr_of_links {
        model
            .add_link(Link::new(
                format!("link{}", i),
                1.0 + 0.1 * i as f64,
                Vector3::new(0.02, 0.0, 0.1),
                Matrix3::identity() * 0.01,
            ))
            .unwrap();
    }

    for i in 1..nr_of_links {
        let kind = if i % 3 == 0 {
            JointDofType::Prismatic
        } else {
            JointDofType::Revolute
        };

        model
            .add_joint(Joint::new(
                format!("joint{}", i),
                kind,
                LinkIndex::new(i - 1),
                LinkIndex::new(i),
                Isometry3::from_parts(
                    Translation3::new(0.0, 0.05, 0.2),
                    UnitQuaternion::from_euler_angles(0.1, 0.0, 0.2),
                ),
                Vector3::y_axis(),
            ))
            .unwrap();
    }

    model
}

fn create_sensors(model: &Model) -> SensorsList {
    let mut sensors = SensorsList::new();
    for link in model.links() {
        sensors
            .add_accelerometer(LinkSensor::new(
                format!("{}_acc", link.name()),
                link.name().to_string(),
                Isometry3::translation(0.01, 0.02, 0.03),
            ))
            .unwrap();
        sensors
            .add_gyroscope(LinkSensor::new(
                format!("{}_gyro", link.name()),
                link.name().to_string(),
                Isometry3::identity(),
            ))
            .unwrap();
    }

    sensors
}
