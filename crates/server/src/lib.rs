mod api;
mod error;
pub mod identity;
pub mod logger;
mod pages;
mod request_log;

use std::net::SocketAddr;

use axum::{Router, routing::get};
use config::Config;
use http::StatusCode;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;

pub use error::Error;
pub use identity::{IdentityError, VerifiedClient};
pub use request_log::{RequestLogLayer, RequestRecord};

pub(crate) type Result<T> = std::result::Result<T, error::Error>;

pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: Config,
    /// Cancel to stop accepting connections and drain the in-flight requests.
    pub shutdown_signal: CancellationToken,
    pub log_filter: String,
}

pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter,
    }: ServeConfig,
) -> crate::Result<()> {
    logger::init(&log_filter);

    let app = router(&config, RequestLogLayer::new());

    let listener = TcpListener::bind(listen_address).await.map_err(Error::Bind)?;
    let local_address = listener.local_addr().map_err(Error::Bind)?;

    log::info!("Identity gateway listening on http://{local_address}");
    log::debug!("Serving static files from {}", config.server.static_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal.cancelled_owned())
        .await
        .map_err(Error::Server)?;

    log::info!("Identity gateway stopped");

    Ok(())
}

/// Build the gateway routes, wrapped in the request logging layer.
pub fn router(config: &Config, request_log: RequestLogLayer) -> Router {
    let routes = Router::new()
        .route("/", get(pages::index))
        .route("/protected", get(pages::protected_page))
        .route("/health", get(pages::health))
        .route("/api/health", get(pages::health))
        .route("/me", get(api::me))
        .route("/api/me", get(api::me))
        .route("/api/protected", get(api::protected))
        .nest_service("/static", pages::static_files(&config.server.static_dir))
        .fallback(not_found);

    with_request_log(routes, request_log)
}

/// A panicking handler becomes a 500 response before it reaches the request log.
fn with_request_log(routes: Router, request_log: RequestLogLayer) -> Router {
    routes.layer(CatchPanicLayer::new()).layer(request_log)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
