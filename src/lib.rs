pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Action, CliConfig};

pub use adapters::{geocoding::GoogleGeocoder, map::HeadlessMap, places::StaticPlaceProvider};
pub use config::TomlConfig;
pub use crate::core::board::{resolve_address, AddressResolution, PlaceBoard};
pub use crate::core::event::BoardEvent;
pub use domain::model::{LatLng, MarkerSize, Place, ADDRESS_NOT_FOUND};
pub use utils::error::{BoardError, Result};
