/// Defines the sensors that can be attached to a model.
pub mod sensor_elements;

/// Defines the prediction of sensor measurements from the state of a model.
pub mod prediction;
