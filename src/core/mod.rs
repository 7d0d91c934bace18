pub mod board;
pub mod bounds;
pub mod event;

pub use crate::domain::model::{Bounds, LatLng, Place, Selection, Viewport};
pub use crate::domain::ports::{Geocoder, MapWidget, PlaceProvider};
pub use crate::utils::error::Result;
