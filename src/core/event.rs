use crate::core::board::PlaceBoard;
use crate::domain::model::LatLng;
use crate::domain::ports::{Geocoder, MapWidget, PlaceProvider};
use crate::utils::error::Result;
use tokio::sync::mpsc;

/// 所有會改變看板狀態的輸入，統一交給擁有者的事件迴圈處理
pub enum BoardEvent<W: MapWidget> {
    MapReady(W::Map),
    MarkerReady { marker: W::Marker, place_id: String },
    CenterChanged(LatLng),
    MarkerClicked(String),
    ListClicked(String),
    PopupClosed,
    Inject,
    Refetch,
}

impl<W: MapWidget> std::fmt::Debug for BoardEvent<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardEvent::MapReady(map) => f.debug_tuple("MapReady").field(map).finish(),
            BoardEvent::MarkerReady { marker, place_id } => f
                .debug_struct("MarkerReady")
                .field("marker", marker)
                .field("place_id", place_id)
                .finish(),
            BoardEvent::CenterChanged(center) => {
                f.debug_tuple("CenterChanged").field(center).finish()
            }
            BoardEvent::MarkerClicked(id) => f.debug_tuple("MarkerClicked").field(id).finish(),
            BoardEvent::ListClicked(id) => f.debug_tuple("ListClicked").field(id).finish(),
            BoardEvent::PopupClosed => f.write_str("PopupClosed"),
            BoardEvent::Inject => f.write_str("Inject"),
            BoardEvent::Refetch => f.write_str("Refetch"),
        }
    }
}

impl<W, G, P> PlaceBoard<W, G, P>
where
    W: MapWidget,
    G: Geocoder + 'static,
    P: PlaceProvider,
{
    pub async fn handle(&mut self, event: BoardEvent<W>) -> Result<()> {
        tracing::debug!("Handling {:?}", event);
        match event {
            BoardEvent::MapReady(map) => self.on_map_ready(map),
            BoardEvent::MarkerReady { marker, place_id } => self.on_marker_ready(marker, &place_id),
            BoardEvent::CenterChanged(center) => self.on_center_changed(center),
            BoardEvent::MarkerClicked(id) => {
                self.select_place(&id)?;
            }
            BoardEvent::ListClicked(id) => {
                self.focus_place(&id)?;
            }
            BoardEvent::PopupClosed => self.on_popup_closed(),
            BoardEvent::Inject => {
                self.inject_place()?;
            }
            BoardEvent::Refetch => self.refetch_places().await?,
        }
        Ok(())
    }

    /// 單一擁有者迴圈：依序處理 UI 事件與查詢結果。
    /// 事件通道關閉後會等待進行中的查詢全部套用才回傳；卡住的查詢會讓它一直等下去。
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<BoardEvent<W>>) -> Self {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle(event).await {
                            tracing::error!("❌ {}", e);
                        }
                    }
                    None => {
                        tracing::debug!("Event channel closed, settling {} lookups", self.in_flight());
                        self.settle_all().await;
                        break;
                    }
                },
                Some(resolution) = self.resolutions_rx.recv() => {
                    self.apply_resolution(resolution);
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::map::{HeadlessMap, MapId, MarkerId};
    use crate::adapters::places::StaticPlaceProvider;
    use crate::utils::error::BoardError;
    use async_trait::async_trait;

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse_geocode(&self, _position: LatLng) -> Result<String> {
            Ok("1 Church St".to_string())
        }
    }

    #[tokio::test]
    async fn test_handle_unknown_marker_click_is_error() {
        let mut board = PlaceBoard::new(HeadlessMap::new(), FixedGeocoder, StaticPlaceProvider::demo());
        board.initialize().await.unwrap();

        let result = board
            .handle(BoardEvent::MarkerClicked("nobody".to_string()))
            .await;
        assert!(matches!(result, Err(BoardError::UnknownPlaceError { .. })));
    }

    #[tokio::test]
    async fn test_run_processes_events_and_resolutions() {
        let mut board = PlaceBoard::new(HeadlessMap::new(), FixedGeocoder, StaticPlaceProvider::demo());
        board.initialize().await.unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(board.run(rx));

        tx.send(BoardEvent::MapReady(MapId(1))).unwrap();
        tx.send(BoardEvent::MarkerReady {
            marker: MarkerId(10),
            place_id: "doe".to_string(),
        })
        .unwrap();
        tx.send(BoardEvent::Inject).unwrap();
        tx.send(BoardEvent::MarkerClicked("doe".to_string())).unwrap();

        drop(tx);

        let board = handle.await.unwrap();
        assert_eq!(board.places().len(), 3);
        assert_eq!(board.in_flight(), 0);
        assert_eq!(
            board.selected_place().and_then(|p| p.address.as_deref()),
            Some("1 Church St")
        );
        assert!(board.popup_visible());
    }
}
