// Adapters layer: concrete implementations of the domain ports (map widget, geocoding, place data).

pub mod geocoding;
pub mod map;
pub mod places;
