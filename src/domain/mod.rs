// Domain layer: models and capability ports. Nothing here talks to the network.

pub mod model;
pub mod ports;
