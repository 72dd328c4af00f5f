//! Domain layer: entities, value objects, and the ports the engine depends on.

pub mod catalog;
pub mod entry;
pub mod money;
pub mod ports;
pub mod sale;
