//! Device location subsystem.
//!
//! Tiered resolution: last known fix → live fix → manual entry → persisted
//! default, each tier's failure contained at its own boundary.

pub mod resolver;
pub mod sensor;
pub mod store;
pub mod types;

pub use resolver::{LocationResolver, DEFAULT_COORDINATE};
pub use sensor::{IpGeoSensor, PositionSensor, UnsupportedSensor};
pub use store::PreferenceStore;
pub use types::{LocationSource, ManualLocation, ResolvedLocation, SensorError};
