use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};
use crate::openapi;

/// Photo batches are far larger than JSON bodies.
const PHOTO_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", post(handler::sign_in))
        .route("/user/product", post(handler::create_product))
        .route("/user/product/:google_id", get(handler::list_products))
        .route(
            "/user/product/:google_id/:id",
            get(handler::get_product)
                .put(handler::update_product)
                .delete(handler::delete_product),
        )
        .route(
            "/user/photos",
            post(handler::upload_photos).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route("/docs", get(openapi::swagger_ui))
}

/// The whole service, ready to hand to `axum::serve`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handler::healthcheck))
        .route("/swagger.json", get(openapi::swagger_json))
        .nest("/api", routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
