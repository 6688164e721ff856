// Domain layer: models and ports shared by the harvesting pipelines.

pub mod model;
pub mod ports;
