use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::hierarchy::SegmentTree;
use crate::services::row_source::load_tree;
use crate::state::AppState;

/// Loads the initial tree from the configured source.
///
/// A failed load is logged and the service starts with an empty tree, so a
/// dataset can still be posted to `/graphs/input.csv`.
pub async fn initial_tree(config: &Config) -> SegmentTree {
    let Some(source) = &config.source else {
        tracing::warn!("No row source configured, starting with an empty tree");
        return SegmentTree::empty();
    };

    match load_tree(source, config.account_delimiter).await {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("Failed to load rows from {:?}: {}", source, e);
            SegmentTree::empty()
        }
    }
}

/// Build the application state and Axum router from a [`Config`] and an
/// already loaded tree.
pub fn build_app(config: Config, tree: SegmentTree) -> (AppState, Router) {
    let static_path = config.static_path.clone();
    let max_upload_bytes = config.max_upload_bytes;
    let state = AppState::new(config, tree);

    let app = Router::new()
        .merge(handlers::routes())
        .nest_service("/static", ServeDir::new(static_path))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (state, app)
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
