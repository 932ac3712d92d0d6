//! HTTP read path
//!
//! Serves the stored catalog joined with prices. The server only reads; the
//! scheduler is the sole writer.

mod types;

pub use types::{merge_all, ProductResponse};

use crate::error::{Error, Result};
use crate::kinds::{EntityKind, PriceKind, PriceRecord, ProductKind, ProductRecord};
use crate::store::{blocking, KvStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    store: KvStore,
}

/// Build the router over `store`
pub fn router(store: KvStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/products", get(list_products))
        .route("/products/:sku", get(get_product))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState { store }))
}

/// Start the HTTP server
pub async fn serve(store: KvStore, port: u16) -> Result<()> {
    let app = router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Every stored product joined with its price
async fn list_products(State(state): State<Arc<AppState>>) -> Response {
    let products = read_collection::<ProductRecord>(&state.store, ProductKind.collection()).await;
    let products = match products {
        Ok(products) => products,
        Err(e) => return internal_error("products", &e),
    };
    let prices = read_collection::<PriceRecord>(&state.store, PriceKind.collection()).await;
    let prices = match prices {
        Ok(prices) => prices,
        Err(e) => return internal_error("prices", &e),
    };

    (StatusCode::OK, Json(merge_all(products, prices))).into_response()
}

/// One stored product joined with its price
async fn get_product(State(state): State<Arc<AppState>>, Path(sku): Path<String>) -> Response {
    let store = state.store.clone();
    let id = sku.clone();
    let product = blocking(move || store.read_one::<ProductRecord>(ProductKind.collection(), &id)).await;

    let product = match product {
        Ok(product) => product,
        Err(Error::NotFound { .. } | Error::CollectionNotFound { .. }) => {
            return (StatusCode::NOT_FOUND, format!("Product not found: {sku}")).into_response();
        }
        Err(e) => return internal_error("products", &e),
    };

    let store = state.store.clone();
    let price = blocking(move || store.read_one::<PriceRecord>(PriceKind.collection(), &sku)).await;
    let price = match price {
        Ok(price) => Some(price),
        Err(Error::NotFound { .. } | Error::CollectionNotFound { .. }) => None,
        Err(e) => return internal_error("prices", &e),
    };

    (
        StatusCode::OK,
        Json(ProductResponse::merge(product, price.as_ref())),
    )
        .into_response()
}

/// Read a whole collection; a collection that was never synced reads as empty
async fn read_collection<T>(store: &KvStore, collection: &'static str) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    let store = store.clone();
    match blocking(move || store.read_all::<T>(collection)).await {
        Err(Error::CollectionNotFound { .. }) => Ok(Vec::new()),
        other => other,
    }
}

fn internal_error(what: &str, err: &Error) -> Response {
    tracing::error!("Error fetching {}: {}", what, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error fetching {what}: {err}"),
    )
        .into_response()
}
