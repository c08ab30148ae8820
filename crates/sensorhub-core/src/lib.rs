pub mod adapter;
pub mod error;
pub mod measurement;
pub mod receiver;
pub mod registry;
pub mod store;

pub use adapter::{SensorAdapter, SensorConfig, SensorState, SensorUpdate};
pub use error::DecodeError;
pub use measurement::{Measurement, MeasurementData};
pub use receiver::{Receiver, MAX_DATAGRAM};
pub use registry::TaskRegistry;
pub use store::MeasurementStore;

#[cfg(test)]
mod tests;
