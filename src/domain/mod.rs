// Domain layer: workflow values and the store port. Steps pass these by value.

pub mod model;
pub mod ports;
