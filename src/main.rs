use ledger_graphs::config::Config;
use ledger_graphs::server::{build_app, initial_tree, serve};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_graphs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting ledger-graphs {} on {}",
        ledger_graphs::VERSION,
        config.address()
    );

    let tree = initial_tree(&config).await;
    let (host, port) = (config.host.clone(), config.port);
    let (_state, app) = build_app(config, tree);

    let (port, handle) = serve(app, &host, port).await?;
    tracing::info!("Listening on http://{}:{}", host, port);

    handle.await?;
    Ok(())
}
