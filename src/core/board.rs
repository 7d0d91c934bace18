use crate::domain::model::{
    Animation, Bounds, LatLng, MarkerSize, Place, PopupContent, Selection, Viewport,
    ADDRESS_NOT_FOUND,
};
use crate::domain::ports::{Geocoder, MapWidget, PlaceProvider};
use crate::utils::error::{BoardError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 非同步地址查詢的結果，送回看板所在的事件迴圈套用
#[derive(Debug, Clone, PartialEq)]
pub struct AddressResolution {
    pub place_id: String,
    pub token: u64,
    pub address: String,
}

/// 反向地理編碼；任何失敗都以 "Not Found" 取代
pub async fn resolve_address<G: Geocoder + ?Sized>(geocoder: &G, position: LatLng) -> String {
    match geocoder.reverse_geocode(position).await {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!("Reverse geocoding of ({}) failed: {}", position, e);
            ADDRESS_NOT_FOUND.to_string()
        }
    }
}

pub struct PlaceBoard<W: MapWidget, G: Geocoder, P: PlaceProvider> {
    widget: W,
    geocoder: Arc<G>,
    provider: P,
    places: Vec<Place>,
    markers: HashMap<String, W::Marker>,
    map: Option<W::Map>,
    viewport: Viewport,
    selection: Option<Selection>,
    popup_deferred: bool,
    pending_refit: bool,
    seen_ids: HashSet<String>,
    next_token: u64,
    latest_selection: Option<u64>,
    selected_marker_size: MarkerSize,
    outstanding: HashSet<u64>,
    resolutions_tx: mpsc::UnboundedSender<AddressResolution>,
    pub(crate) resolutions_rx: mpsc::UnboundedReceiver<AddressResolution>,
}

impl<W, G, P> PlaceBoard<W, G, P>
where
    W: MapWidget,
    G: Geocoder + 'static,
    P: PlaceProvider,
{
    pub fn new(widget: W, geocoder: G, provider: P) -> Self {
        let (resolutions_tx, resolutions_rx) = mpsc::unbounded_channel();
        Self {
            widget,
            geocoder: Arc::new(geocoder),
            provider,
            places: Vec::new(),
            markers: HashMap::new(),
            map: None,
            viewport: Viewport::default(),
            selection: None,
            popup_deferred: false,
            pending_refit: false,
            seen_ids: HashSet::new(),
            next_token: 0,
            latest_selection: None,
            selected_marker_size: MarkerSize::SELECTED,
            outstanding: HashSet::new(),
            resolutions_tx,
            resolutions_rx,
        }
    }

    pub fn with_initial_center(mut self, center: LatLng) -> Self {
        self.viewport.center = center;
        self
    }

    pub fn with_selected_marker_size(mut self, size: MarkerSize) -> Self {
        self.selected_marker_size = size;
        self
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_place(&self) -> Option<&Place> {
        self.selection.as_ref().and_then(|s| self.place(&s.place_id))
    }

    pub fn popup_visible(&self) -> bool {
        self.selection.as_ref().is_some_and(|s| s.popup_open)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn marker(&self, place_id: &str) -> Option<&W::Marker> {
        self.markers.get(place_id)
    }

    pub fn map_ready(&self) -> bool {
        self.map.is_some()
    }

    pub fn pending_refit(&self) -> bool {
        self.pending_refit
    }

    /// 尚未套用的地址查詢數量
    pub fn in_flight(&self) -> usize {
        self.outstanding.len()
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// 載入初始地點清單；地圖就緒後才會 fit
    pub async fn initialize(&mut self) -> Result<()> {
        let places = self.provider.fetch_places().await?;
        tracing::info!("Loaded {} places", places.len());
        self.replace_places(places)
    }

    /// 重新取得地點；舊物件上的地址與放大的標記都會被丟棄
    pub async fn refetch_places(&mut self) -> Result<()> {
        let places = self.provider.fetch_places().await?;
        tracing::info!("Refetched {} places", places.len());
        self.replace_places(places)
    }

    fn replace_places(&mut self, places: Vec<Place>) -> Result<()> {
        let mut ids = HashSet::new();
        for place in &places {
            if !ids.insert(place.id.as_str()) {
                return Err(BoardError::DuplicatePlaceError {
                    id: place.id.clone(),
                });
            }
        }

        if self.popup_visible() {
            self.widget.close_popup();
        }
        self.selection = None;
        self.popup_deferred = false;
        self.latest_selection = None;

        self.seen_ids.extend(places.iter().map(|p| p.id.clone()));
        self.places = places;
        self.place_all_markers();
        self.fit_bounds();
        Ok(())
    }

    /// 地圖就緒：保存控制代碼並立即 fit。重複呼叫會覆蓋舊的控制代碼。
    pub fn on_map_ready(&mut self, map: W::Map) {
        tracing::debug!("Map ready: {:?}", map);
        self.map = Some(map);
        self.place_all_markers();
        self.fit_bounds();
    }

    pub fn on_marker_ready(&mut self, marker: W::Marker, place_id: &str) {
        tracing::debug!("Marker ready for '{}': {:?}", place_id, marker);
        self.markers.insert(place_id.to_string(), marker);

        let anchors_selection = self
            .selection
            .as_ref()
            .is_some_and(|s| s.popup_open && s.place_id == place_id);
        if self.popup_deferred && anchors_selection {
            self.popup_deferred = false;
            self.show_selected_popup();
        }
    }

    pub fn on_center_changed(&mut self, center: LatLng) {
        if self.map.is_some() {
            self.viewport.center = center;
        }
    }

    pub fn on_popup_closed(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            selection.popup_open = false;
        }
        self.popup_deferred = false;
    }

    /// 讓地圖框住所有地點。地圖未就緒時記下待處理，空清單則不做任何事。
    pub fn fit_bounds(&mut self) -> Option<Bounds> {
        let Some(map) = self.map.as_ref() else {
            tracing::debug!("Map not ready, deferring bounds-fit");
            self.pending_refit = true;
            return None;
        };
        self.pending_refit = false;

        let bounds = Bounds::enclosing(&self.places)?;
        tracing::debug!("Fitting bounds {:?}", bounds);
        self.widget.fit_bounds(map, &bounds);
        self.viewport.framed = Some(bounds);
        self.viewport.center = bounds.center();
        Some(bounds)
    }

    /// 點擊標記：發出地址查詢，結果於 `apply_resolution` 套用
    ///
    /// # Panics
    ///
    /// 查詢以 `tokio::spawn` 發出，必須在 tokio runtime 內呼叫。
    pub fn select_place(&mut self, place_id: &str) -> Result<u64> {
        let token = self.next_token;
        let place = self
            .places
            .iter_mut()
            .find(|p| p.id == place_id)
            .ok_or_else(|| BoardError::UnknownPlaceError {
                id: place_id.to_string(),
            })?;
        self.next_token += 1;
        place.lookup_token = Some(token);
        self.latest_selection = Some(token);
        self.outstanding.insert(token);

        tracing::info!("Selecting '{}', resolving address (token {})", place.id, token);

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.resolutions_tx.clone();
        let place_id = place.id.clone();
        let position = place.position;
        tokio::spawn(async move {
            let address = resolve_address(geocoder.as_ref(), position).await;
            let _ = tx.send(AddressResolution {
                place_id,
                token,
                address,
            });
        });

        Ok(token)
    }

    /// 清單連結：標記掉落動畫、關閉視窗、發出查詢並立即置中
    pub fn focus_place(&mut self, place_id: &str) -> Result<u64> {
        let position = {
            let place = self
                .places
                .iter_mut()
                .find(|p| p.id == place_id)
                .ok_or_else(|| BoardError::UnknownPlaceError {
                    id: place_id.to_string(),
                })?;
            place.animation = Some(Animation::Drop);
            place.position
        };
        self.place_marker(place_id);

        if self.popup_visible() {
            self.widget.close_popup();
        }
        self.on_popup_closed();

        let token = self.select_place(place_id)?;
        self.recenter(position);
        Ok(token)
    }

    /// 套用查詢結果。回傳地址是否寫入。
    pub fn apply_resolution(&mut self, resolution: AddressResolution) -> bool {
        if !self.outstanding.remove(&resolution.token) {
            tracing::debug!(
                "Ignoring resolution with unknown token {} for '{}'",
                resolution.token,
                resolution.place_id
            );
            return false;
        }

        let selected_size = self.selected_marker_size;
        let is_latest = self.latest_selection == Some(resolution.token);
        let Some(place) = self
            .places
            .iter_mut()
            .find(|p| p.id == resolution.place_id && p.lookup_token == Some(resolution.token))
        else {
            tracing::debug!(
                "Discarding stale address for '{}' (token {})",
                resolution.place_id,
                resolution.token
            );
            return false;
        };

        place.address = Some(resolution.address);
        if !is_latest {
            tracing::debug!("Stored address for '{}' without displaying it", place.id);
            return true;
        }

        place.marker_size = selected_size;
        let position = place.position;
        let place_id = place.id.clone();
        self.place_marker(&place_id);

        // 先關再開，讓元件重新錨定視窗
        if self.popup_visible() {
            self.widget.close_popup();
        }
        self.selection = Some(Selection {
            place_id,
            popup_open: true,
        });
        self.show_selected_popup();
        self.recenter(position);
        true
    }

    /// 等待下一筆查詢結果並套用；沒有進行中的查詢時回傳 `None`
    pub async fn settle_next(&mut self) -> Option<bool> {
        if self.outstanding.is_empty() {
            return None;
        }
        let resolution = self.resolutions_rx.recv().await?;
        Some(self.apply_resolution(resolution))
    }

    pub async fn settle_all(&mut self) {
        while self.settle_next().await.is_some() {}
    }

    pub fn inject_place(&mut self) -> Result<String> {
        let id = self.fresh_id(self.provider.id_prefix());
        let place = self.provider.injected_place(id.clone());
        tracing::info!("Injecting place '{}'", id);
        self.insert_place(place)?;
        Ok(id)
    }

    pub fn insert_place(&mut self, mut place: Place) -> Result<()> {
        if self.place(&place.id).is_some() {
            return Err(BoardError::DuplicatePlaceError { id: place.id });
        }
        place.lookup_token = None;
        self.seen_ids.insert(place.id.clone());
        let id = place.id.clone();
        self.places.push(place);
        self.place_marker(&id);
        self.fit_bounds();
        Ok(())
    }

    /// `base`, `base2`, `base3`… 中第一個從未出現過的 id
    fn fresh_id(&self, base: &str) -> String {
        (1u64..)
            .map(|n| {
                if n == 1 {
                    base.to_string()
                } else {
                    format!("{}{}", base, n)
                }
            })
            .find(|candidate| !self.seen_ids.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn recenter(&mut self, position: LatLng) {
        self.viewport.center = position;
        if let Some(map) = self.map.as_ref() {
            self.widget.set_center(map, position);
        }
    }

    fn place_marker(&mut self, place_id: &str) {
        let Some(map) = self.map.as_ref() else {
            return;
        };
        if let Some(place) = self.places.iter().find(|p| p.id == place_id) {
            self.widget.place_marker(map, place);
        }
    }

    fn place_all_markers(&mut self) {
        let Some(map) = self.map.as_ref() else {
            return;
        };
        for place in &self.places {
            self.widget.place_marker(map, place);
        }
    }

    fn show_selected_popup(&mut self) {
        let Some(place) = self.selected_place() else {
            return;
        };
        let content = PopupContent::for_place(place);
        match self.markers.get(&place.id).cloned() {
            Some(anchor) => {
                self.widget.show_popup(&anchor, &content);
                self.popup_deferred = false;
            }
            None => {
                tracing::debug!("No marker for '{}' yet, deferring popup", content.title);
                self.popup_deferred = true;
            }
        }
    }
}
