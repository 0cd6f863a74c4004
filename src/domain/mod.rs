// Domain layer: core models and ports (interfaces). No external dependencies
// beyond std/serde/chrono; concrete IO lives in adapters.

pub mod model;
pub mod ports;
