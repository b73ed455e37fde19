/// Defines the kinematic and dynamic state buffers.
pub mod state;

/// Defines the forward kinematics and recursive Newton-Euler computations.
pub mod oracle;

use nalgebra::DVector;

use crate::{model_elements::frame_elements::Joint, Error};

/// Returns the value of the degree of freedom of the joint, or zero if the joint has no degree of
/// freedom.
pub(crate) fn joint_value(joint: &Joint, values: &DVector<f64>) -> f64 {
    if joint.nr_of_dofs() == 0 {
        0.0
    } else {
        values[joint.dof_offset()]
    }
}

pub(crate) fn check_size(what: &str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::SizeMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }

    Ok(())
}
