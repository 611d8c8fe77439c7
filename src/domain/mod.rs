// Domain layer: models, session context, typed submissions and ports.

pub mod model;
pub mod ports;
pub mod session;
pub mod submission;
