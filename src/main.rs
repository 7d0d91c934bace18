use clap::Parser;
use place_board::adapters::map::deliver_ready_markers;
use place_board::domain::ports::MapWidget;
use place_board::utils::{logger, validation::Validate};
use place_board::{
    Action, CliConfig, GoogleGeocoder, HeadlessMap, PlaceBoard, StaticPlaceProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting place-board");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let geocoder = GoogleGeocoder::new(
        config.geocoding.endpoint.clone(),
        config.credentials.geocoding_api_key.clone(),
    )
    .with_timeout(config.timeout())?
    .with_language(config.geocoding.language.clone())
    .with_region(config.geocoding.region.clone());

    let provider = config
        .places()
        .map(StaticPlaceProvider::new)
        .unwrap_or_else(StaticPlaceProvider::demo);

    let mut widget = HeadlessMap::new().with_api_key(config.credentials.maps_api_key.clone());
    let map = widget.create_map();

    let mut board = PlaceBoard::new(widget, geocoder, provider)
        .with_initial_center(config.initial_center())
        .with_selected_marker_size(config.selected_marker_size());

    board.initialize().await?;
    board.on_map_ready(map);
    deliver_ready_markers(&mut board);

    for action in &cli.actions {
        tracing::info!("▶️ {:?}", action);
        let result = match action {
            Action::Select(id) => board.select_place(id).map(|_| ()),
            Action::Focus(id) => board.focus_place(id).map(|_| ()),
            Action::Inject => board.inject_place().map(|_| ()),
            Action::Refetch => board.refetch_places().await,
            Action::Close => {
                board.widget_mut().close_popup();
                board.on_popup_closed();
                Ok(())
            }
            Action::Center(center) => {
                board.on_center_changed(*center);
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!("❌ {:?} failed: {}", action, e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            continue;
        }

        board.settle_all().await;
        deliver_ready_markers(&mut board);
    }

    println!("📍 Places:");
    for place in board.places() {
        println!(
            "  {} ({}) at {} [{}x{}] address: {}",
            place.name,
            place.id,
            place.position,
            place.marker_size.width,
            place.marker_size.height,
            place.address.as_deref().unwrap_or("-")
        );
    }
    println!("🎯 Center: {}", board.viewport().center);
    match board.widget().popup() {
        Some((_, content)) => println!("💬 Popup: {}", content),
        None => println!("💬 Popup: closed"),
    }

    Ok(())
}
