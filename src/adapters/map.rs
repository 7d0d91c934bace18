use crate::core::board::PlaceBoard;
use crate::domain::model::{Animation, Bounds, LatLng, MarkerSize, Place, PopupContent};
use crate::domain::ports::{Geocoder, MapWidget, PlaceProvider};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum MapInstruction {
    FitBounds(Bounds),
    SetCenter(LatLng),
    PlaceMarker {
        place_id: String,
        position: LatLng,
        size: MarkerSize,
        animation: Option<Animation>,
    },
    ShowPopup {
        anchor: MarkerId,
        content: PopupContent,
    },
    ClosePopup,
}

/// 不畫任何東西的地圖元件：把每個指令寫入日誌並保留下來。
/// 地圖金鑰只用來載入地圖腳本，這裡僅記錄是否有設定。
#[derive(Debug, Default)]
pub struct HeadlessMap {
    api_key: String,
    next_id: u32,
    markers: HashMap<String, MarkerId>,
    ready: Vec<(MarkerId, String)>,
    instructions: Vec<MapInstruction>,
    popup: Option<(MarkerId, PopupContent)>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn create_map(&mut self) -> MapId {
        self.next_id += 1;
        if self.api_key.trim().is_empty() {
            tracing::warn!("Created map #{} without a maps API key", self.next_id);
        } else {
            tracing::debug!("Created map #{} with maps API key", self.next_id);
        }
        MapId(self.next_id)
    }

    pub fn instructions(&self) -> &[MapInstruction] {
        &self.instructions
    }

    pub fn clear_instructions(&mut self) {
        self.instructions.clear();
    }

    pub fn popup(&self) -> Option<&(MarkerId, PopupContent)> {
        self.popup.as_ref()
    }

    /// 取出已完成繪製、尚未回報的標記
    pub fn take_ready_markers(&mut self) -> Vec<(MarkerId, String)> {
        std::mem::take(&mut self.ready)
    }
}

impl MapWidget for HeadlessMap {
    type Map = MapId;
    type Marker = MarkerId;

    fn fit_bounds(&mut self, _map: &MapId, bounds: &Bounds) {
        tracing::info!(
            "🗺️ fit bounds SW({}, {}) NE({}, {})",
            bounds.south,
            bounds.west,
            bounds.north,
            bounds.east
        );
        self.instructions.push(MapInstruction::FitBounds(*bounds));
    }

    fn set_center(&mut self, _map: &MapId, center: LatLng) {
        tracing::info!("🎯 center on ({})", center);
        self.instructions.push(MapInstruction::SetCenter(center));
    }

    fn place_marker(&mut self, _map: &MapId, place: &Place) {
        tracing::debug!(
            "📍 marker '{}' at ({}) size {}x{}",
            place.id,
            place.position,
            place.marker_size.width,
            place.marker_size.height
        );
        self.instructions.push(MapInstruction::PlaceMarker {
            place_id: place.id.clone(),
            position: place.position,
            size: place.marker_size,
            animation: place.animation,
        });

        if !self.markers.contains_key(&place.id) {
            self.next_id += 1;
            let marker = MarkerId(self.next_id);
            self.markers.insert(place.id.clone(), marker);
            self.ready.push((marker, place.id.clone()));
        }
    }

    fn show_popup(&mut self, anchor: &MarkerId, content: &PopupContent) {
        tracing::info!("💬 popup: {}", content);
        self.instructions.push(MapInstruction::ShowPopup {
            anchor: *anchor,
            content: content.clone(),
        });
        self.popup = Some((*anchor, content.clone()));
    }

    fn close_popup(&mut self) {
        self.instructions.push(MapInstruction::ClosePopup);
        self.popup = None;
    }
}

/// 把元件回報的就緒標記交給看板
pub fn deliver_ready_markers<G, P>(board: &mut PlaceBoard<HeadlessMap, G, P>) -> usize
where
    G: Geocoder + 'static,
    P: PlaceProvider,
{
    let ready = board.widget_mut().take_ready_markers();
    let count = ready.len();
    for (marker, place_id) in ready {
        board.on_marker_ready(marker, &place_id);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_handles_are_stable_per_place() {
        let mut widget = HeadlessMap::new();
        let map = widget.create_map();
        let mut place = Place::new("doe", "John Doe", LatLng::new(1.0, 2.0));

        widget.place_marker(&map, &place);
        place.marker_size = MarkerSize::SELECTED;
        widget.place_marker(&map, &place);

        let ready = widget.take_ready_markers();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].1, "doe");
        assert!(widget.take_ready_markers().is_empty());
        assert_eq!(widget.instructions().len(), 2);
    }

    #[test]
    fn test_api_key_is_kept_for_map_creation() {
        let mut widget = HeadlessMap::new().with_api_key("maps-key");
        assert_eq!(widget.api_key(), "maps-key");
        assert_eq!(widget.create_map(), MapId(1));

        let mut anonymous = HeadlessMap::new();
        assert_eq!(anonymous.api_key(), "");
        assert_eq!(anonymous.create_map(), MapId(1));
    }

    #[test]
    fn test_popup_show_and_close() {
        let mut widget = HeadlessMap::new();
        let content = PopupContent {
            title: "John Doe".to_string(),
            address: None,
        };

        widget.show_popup(&MarkerId(7), &content);
        assert_eq!(widget.popup(), Some(&(MarkerId(7), content)));

        widget.close_popup();
        assert!(widget.popup().is_none());
        assert_eq!(widget.instructions().last(), Some(&MapInstruction::ClosePopup));
    }
}
