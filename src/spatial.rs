//! Spatial (6D) vector algebra.
//!
//! All 6D vectors store the linear part first:
//!
//! * twists are `[v; ω]`,
//! * (proper) accelerations are `[a; ω̇]`,
//! * wrenches are `[f; τ]`.
//!
//! Quantities are expressed in the frame of the link they belong to. A transform `a_h_b` is
//! the [Isometry3] that maps coordinates of frame `b` into frame `a`.

extern crate nalgebra as na;

use na::{Isometry3, Matrix3, Matrix6, Vector3, Vector6};

#[cfg(test)]
#[path = "spatial_tests.rs"]
mod spatial_tests;

/// The 6D velocity of a frame, `[v; ω]`.
pub type Twist = Vector6<f64>;

/// The 6D acceleration of a frame, `[a; ω̇]`.
pub type SpatialAcc = Vector6<f64>;

/// A 6D force, `[f; τ]`.
pub type Wrench = Vector6<f64>;

/// Returns the matrix `[v]×` such that `[v]× * w = v × w`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Returns the linear (first) part of a 6D vector.
pub fn linear(v: &Vector6<f64>) -> Vector3<f64> {
    v.fixed_rows::<3>(0).into_owned()
}

/// Returns the angular (second) part of a 6D vector.
pub fn angular(v: &Vector6<f64>) -> Vector3<f64> {
    v.fixed_rows::<3>(3).into_owned()
}

/// Creates a 6D vector from its linear and angular parts.
pub fn from_parts(linear: &Vector3<f64>, angular: &Vector3<f64>) -> Vector6<f64> {
    let mut result = Vector6::zeros();
    result.fixed_rows_mut::<3>(0).copy_from(linear);
    result.fixed_rows_mut::<3>(3).copy_from(angular);
    result
}

/// Returns the adjoint matrix `a_X_b` that maps twists and accelerations expressed in frame `b`
/// to frame `a`.
///
/// For `a_h_b = (R, p)` the matrix is
///
/// ```text
/// [ R   [p]×R ]
/// [ 0     R   ]
/// ```
pub fn motion_adjoint(a_h_b: &Isometry3<f64>) -> Matrix6<f64> {
    let rotation = a_h_b.rotation.to_rotation_matrix().into_inner();
    let translation = a_h_b.translation.vector;

    let mut result = Matrix6::zeros();
    result.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    result
        .fixed_view_mut::<3, 3>(0, 3)
        .copy_from(&(skew(&translation) * rotation));
    result.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);
    result
}

/// Returns the dual adjoint matrix `a_X*_b` that maps wrenches expressed in frame `b` to
/// frame `a`.
///
/// For `a_h_b = (R, p)` the matrix is
///
/// ```text
/// [   R     0 ]
/// [ [p]×R   R ]
/// ```
pub fn force_adjoint(a_h_b: &Isometry3<f64>) -> Matrix6<f64> {
    let rotation = a_h_b.rotation.to_rotation_matrix().into_inner();
    let translation = a_h_b.translation.vector;

    let mut result = Matrix6::zeros();
    result.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
    result
        .fixed_view_mut::<3, 3>(3, 0)
        .copy_from(&(skew(&translation) * rotation));
    result.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);
    result
}

/// Returns the motion cross product matrix `v×` such that `v× * m` is the derivative of the
/// motion vector `m` in a frame moving with twist `v`.
pub fn cross_motion(v: &Twist) -> Matrix6<f64> {
    let lin = skew(&linear(v));
    let ang = skew(&angular(v));

    let mut result = Matrix6::zeros();
    result.fixed_view_mut::<3, 3>(0, 0).copy_from(&ang);
    result.fixed_view_mut::<3, 3>(0, 3).copy_from(&lin);
    result.fixed_view_mut::<3, 3>(3, 3).copy_from(&ang);
    result
}

/// Returns the force cross product matrix `v×*`, the dual of [cross_motion].
pub fn cross_force(v: &Twist) -> Matrix6<f64> {
    -cross_motion(v).transpose()
}

/// Returns the 6x6 spatial inertia of a rigid body expressed in its link frame.
///
/// ## Parameters
///
/// * 'mass' - The mass of the body in kg.
/// * 'center_of_mass' - The center of mass, expressed in the link frame.
/// * 'rotational_inertia' - The rotational inertia about the center of mass, with the
///   orientation of the link frame.
pub fn spatial_inertia(
    mass: f64,
    center_of_mass: &Vector3<f64>,
    rotational_inertia: &Matrix3<f64>,
) -> Matrix6<f64> {
    let c = skew(center_of_mass);

    let mut result = Matrix6::zeros();
    result
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&(Matrix3::identity() * mass));
    result.fixed_view_mut::<3, 3>(0, 3).copy_from(&(-mass * c));
    result.fixed_view_mut::<3, 3>(3, 0).copy_from(&(mass * c));
    result
        .fixed_view_mut::<3, 3>(3, 3)
        .copy_from(&(rotational_inertia - mass * c * c));
    result
}

/// Returns the net wrench `I * a + v ×* (I * v)` needed to give a body with spatial inertia `I`
/// and twist `v` the proper acceleration `a`. Because the acceleration is a proper one the
/// result does not contain the gravitational wrench.
pub fn net_wrench_without_gravity(
    inertia: &Matrix6<f64>,
    proper_acceleration: &SpatialAcc,
    twist: &Twist,
) -> Wrench {
    inertia * proper_acceleration + cross_force(twist) * (inertia * twist)
}
