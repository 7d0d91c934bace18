use crate::domain::model::{LatLng, Place};
use crate::domain::ports::PlaceProvider;
use crate::utils::error::Result;
use async_trait::async_trait;

pub const INJECTED_POSITION: LatLng = LatLng::new(-25.706844782983676, 28.026123041564087);

/// 固定的示範資料
pub fn demo_places() -> Vec<Place> {
    vec![
        Place::new(
            "doe",
            "John Doe",
            LatLng::new(-33.7421825090221, 19.011633172357847),
        ),
        Place::new(
            "doe2",
            "John Doe 2",
            LatLng::new(-33.63241331147623, 19.935613458427238),
        ),
    ]
}

/// 每次 fetch 都回傳全新的地點物件
#[derive(Debug, Clone)]
pub struct StaticPlaceProvider {
    places: Vec<Place>,
    id_prefix: String,
    display_prefix: String,
}

impl StaticPlaceProvider {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places,
            id_prefix: "place".to_string(),
            display_prefix: "Place".to_string(),
        }
    }

    pub fn demo() -> Self {
        Self {
            places: demo_places(),
            id_prefix: "doe".to_string(),
            display_prefix: "John Doe".to_string(),
        }
    }

    pub fn with_prefixes(mut self, id_prefix: &str, display_prefix: &str) -> Self {
        self.id_prefix = id_prefix.to_string();
        self.display_prefix = display_prefix.to_string();
        self
    }
}

impl Default for StaticPlaceProvider {
    fn default() -> Self {
        Self::demo()
    }
}

#[async_trait]
impl PlaceProvider for StaticPlaceProvider {
    async fn fetch_places(&self) -> Result<Vec<Place>> {
        Ok(self
            .places
            .iter()
            .map(|p| Place::new(p.id.clone(), p.name.clone(), p.position).with_marker_size(p.marker_size))
            .collect())
    }

    fn id_prefix(&self) -> &str {
        &self.id_prefix
    }

    fn injected_place(&self, id: String) -> Place {
        let name = match id.strip_prefix(self.id_prefix.as_str()) {
            Some(suffix) if !suffix.is_empty() => format!("{} {}", self.display_prefix, suffix),
            _ => self.display_prefix.clone(),
        };
        Place::new(id, name, INJECTED_POSITION)
    }
}
