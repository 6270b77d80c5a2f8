// Domain layer: kiosk models and ports (interfaces) to the host and the interpretation service.

pub mod model;
pub mod ports;
