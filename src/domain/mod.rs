// Domain layer: models, chat wire types and ports. No I/O lives here.

pub mod chat;
pub mod model;
pub mod ports;
