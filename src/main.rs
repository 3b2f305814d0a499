use anyhow::Result;
use tracing::info;
use translate_gateway::{config::Config, server, Translator};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translate_gateway=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting translation gateway");

    // Load configuration from environment
    let config = Config::from_env()?;
    let translator = Translator::from_config(&config)?;
    info!(
        "Strategies in fallback order: {}",
        translator.strategy_names().join(" -> ")
    );

    server::serve(&config, translator).await
}
