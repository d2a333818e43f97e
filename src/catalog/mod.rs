//! Static reference data: the services configuration and the vehicle list.

pub mod services;
pub mod vehicles;

pub use services::{OptionItem, ServiceOptions, ServicesCatalog};
pub use vehicles::{years_from, Segment, Vehicle, VehicleCatalog};
