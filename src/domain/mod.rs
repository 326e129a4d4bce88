// Domain layer: API payloads, the per-manager record, and the ports the pipeline depends on.

pub mod api;
pub mod model;
pub mod ports;
