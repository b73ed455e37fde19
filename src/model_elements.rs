/// Defines the different frame elements that are used to create a robot model
pub mod frame_elements;

/// Defines the kinematic tree and the robot model.
pub mod model;
