use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use matchbook::config::AppConfig;
use matchbook::state::AppState;
use matchbook::web::routes::{candidates, profiles};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt::init();

    // 2. Shared handles: config, primary store, cache, event sink
    let config = AppConfig::from_env();
    let host = config.host.clone();
    let port = config.port;
    let state = AppState::init(config).await;

    // 3. Routes
    let app = Router::new()
        .route("/api/profiles", post(profiles::register_profile_handler))
        .route(
            "/api/profiles/:profile_id",
            get(profiles::get_profile_handler)
                .put(profiles::update_profile_handler)
                .delete(profiles::delete_profile_handler),
        )
        .route(
            "/api/profiles/:profile_id/candidates",
            get(candidates::find_candidates_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // 4. Serve
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Cannot bind listen address");
    tracing::info!("matchbook listening on http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
