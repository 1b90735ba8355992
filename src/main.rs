use chatter::{
    audio::default_player,
    config::{get_config_dir, load_config},
    latest_message::LatestMessage,
    logging::init_logging,
    transport::{socket::SocketClient, Transport},
    ui::{run_ui, status_bar::StatusBar},
    App, ChatPanel, PanelOptions,
};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = load_config()?;
    let _logger = init_logging(&config, &get_config_dir()?)?;
    info!("Starting chatter against {}", config.endpoint);

    let transport: Arc<dyn Transport> = Arc::new(SocketClient::connect(&config.endpoint)?);
    let audio = default_player(config.send_audio.clone(), config.receive_audio.clone());
    let latest = LatestMessage::default();

    let panel = ChatPanel::new(transport, audio, latest.clone(), PanelOptions::from(&config));
    let mut app = App::new(panel, StatusBar::new(latest.subscribe()));

    run_ui(&mut app).await?;

    info!("Chatter exited");
    Ok(())
}
