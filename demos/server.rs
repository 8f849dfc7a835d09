use argh::FromArgs;
use character_forge::{AppState, Config, router};

#[derive(FromArgs)]
/// Character Forge serves the character generation endpoint.
struct ServerArgs {
    /// the host to run the server on (overrides HOST)
    #[argh(option, short = 'h')]
    host: Option<String>,

    /// the port to run the server on (overrides PORT)
    #[argh(option, short = 'p')]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ServerArgs = argh::from_env();

    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.api_key.is_none() {
        log::warn!("AI_GATEWAY_API_KEY is not set, every generation request will fail");
    }

    let addr = config.address();
    let app = router(AppState::from_config(config)?);

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
