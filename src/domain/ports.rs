use crate::domain::model::{Bounds, LatLng, Place, PopupContent};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 地圖元件。控制代碼由元件產生，核心只負責保存與查詢。
pub trait MapWidget {
    type Map: Clone + std::fmt::Debug;
    type Marker: Clone + std::fmt::Debug;

    fn fit_bounds(&mut self, map: &Self::Map, bounds: &Bounds);
    fn set_center(&mut self, map: &Self::Map, center: LatLng);
    /// 放置或更新標記；完成後元件會回報 `on_marker_ready`
    fn place_marker(&mut self, map: &Self::Map, place: &Place);
    fn show_popup(&mut self, anchor: &Self::Marker, content: &PopupContent);
    fn close_popup(&mut self);
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 回傳第一筆結果的格式化地址
    async fn reverse_geocode(&self, position: LatLng) -> Result<String>;
}

#[async_trait]
pub trait PlaceProvider: Send + Sync {
    async fn fetch_places(&self) -> Result<Vec<Place>>;

    /// 新 id 的前綴，例如 "doe" 產生 doe、doe2、doe3…
    fn id_prefix(&self) -> &str {
        "place"
    }

    /// 「注入」動作建立的地點，id 由看板指定
    fn injected_place(&self, id: String) -> Place;
}
