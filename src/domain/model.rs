use serde::{Deserialize, Serialize};

/// 地址解析失敗時顯示的固定字串
pub const ADDRESS_NOT_FOUND: &str = "Not Found";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// 標記圖示的像素尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSize {
    pub width: u32,
    pub height: u32,
}

impl MarkerSize {
    pub const DEFAULT: MarkerSize = MarkerSize {
        width: 30,
        height: 30,
    };
    pub const SELECTED: MarkerSize = MarkerSize {
        width: 50,
        height: 50,
    };
}

impl Default for MarkerSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub position: LatLng,
    pub address: Option<String>,
    pub marker_size: MarkerSize,
    pub animation: Option<Animation>,
    /// 最近一次發出的地址查詢序號
    #[serde(skip)]
    pub(crate) lookup_token: Option<u64>,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            address: None,
            marker_size: MarkerSize::DEFAULT,
            animation: None,
            lookup_token: None,
        }
    }

    pub fn with_marker_size(mut self, marker_size: MarkerSize) -> Self {
        self.marker_size = marker_size;
        self
    }
}

/// 包含所有位置的最小經緯度範圍
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Viewport {
    pub center: LatLng,
    /// 最近一次 bounds-fit 的範圍
    pub framed: Option<Bounds>,
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub place_id: String,
    pub popup_open: bool,
}

/// 資訊視窗內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub address: Option<String>,
}

impl PopupContent {
    pub fn for_place(place: &Place) -> Self {
        Self {
            title: place.name.clone(),
            address: place.address.clone(),
        }
    }
}

impl std::fmt::Display for PopupContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{} | Address: {}", self.title, address),
            None => write!(f, "{} | Address: …", self.title),
        }
    }
}
