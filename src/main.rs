use crate::startup::AppState;
use axum::{
    Router,
    extract::Extension,
    http::{
        HeaderName, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::{get, post},
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[macro_use]
extern crate tracing;

mod db;
mod domain;
mod error;
mod polls;
mod startup;

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "INFO");
    }
    // initialize tracing
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::init_db(&database_url)
        .await
        .expect("Failed to initialise the database");

    let app_state = AppState::new(pool);

    // build our application with a route
    let app = Router::new()
        .route("/api/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/api/polls/:poll_id", get(polls::get_poll))
        .route("/api/polls/:poll_id/vote", post(polls::vote_on_poll))
        .route("/api/polls/:poll_id/results", get(polls::get_results))
        .route("/api/polls/:poll_id/voted", get(polls::check_vote))
        .route("/api/polls/:poll_id/close", post(polls::close_poll))
        .route("/api/stats", get(polls::stats))
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([
                    axum::http::Method::POST,
                    axum::http::Method::GET,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static("x-voter-id")]),
        )
        .fallback(handler_404);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Unable to spawn tcp listener");

    axum::serve(listener, app).await.unwrap();
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
