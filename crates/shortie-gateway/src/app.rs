use axum::routing::{get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth::authenticate;
use crate::handlers::{
    create_batch_handler, create_json_handler, create_text_handler, delete_user_urls_handler,
    list_user_urls_handler, ping_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let owned = Router::new()
            .route("/", post(create_text_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(create_json_handler))
                    .route("/shorten/batch", post(create_batch_handler))
                    .route(
                        "/user/urls",
                        get(list_user_urls_handler).delete(delete_user_urls_handler),
                    ),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

        Router::new()
            .merge(owned)
            .route("/ping", get(ping_handler))
            .route("/{id}", get(redirect_handler))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestDecompressionLayer::new())
                    .layer(CompressionLayer::new()),
            )
            .with_state(state)
    }
}
