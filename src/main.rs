//! Storefront Backend
//! Mission: Single-admin auth plus a product catalog with image uploads,
//! served over one canonical HTTP contract.

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::{
    auth::{
        api as auth_api, auth_middleware, optional_auth_middleware, AuthState, JwtHandler,
        UserStore,
    },
    catalog::{api as catalog_api, CatalogState, ImageStore, ProductStore},
    config::{load_env, Config},
};

// Multipart bodies may carry a 5 MB image plus text fields.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("Storefront backend starting");

    let config = Config::from_env()?;

    // Storage clients are constructed once here and passed down explicitly.
    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let product_store = Arc::new(ProductStore::new(&config.database_path)?);
    let image_store = Arc::new(ImageStore::new(&config.uploads_dir)?);
    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    info!("Database initialized at: {}", config.database_path);
    info!("Uploads directory: {}", config.uploads_dir);

    let auth_state = AuthState::new(user_store, jwt_handler.clone());
    let catalog_state = CatalogState::new(product_store, image_store);

    // Public auth surface
    let auth_router = Router::new()
        .route("/login", post(auth_api::login))
        .with_state(auth_state.clone());

    // Password rotation requires a verified identity
    let account_router = Router::new()
        .route("/change-password", post(auth_api::change_password))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // Public catalog reads. The optional-auth layer attaches claims when a
    // valid token is present so authenticated listing includes inactive rows.
    let public_catalog = Router::new()
        .route("/products", get(catalog_api::list_products))
        .route("/products/:id", get(catalog_api::get_product))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            optional_auth_middleware,
        ))
        .with_state(catalog_state.clone());

    // Catalog mutations require a verified identity
    let protected_catalog = Router::new()
        .route("/products", post(catalog_api::create_product))
        .route("/products/:id", put(catalog_api::update_product))
        .route("/products/:id", delete(catalog_api::delete_product))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware))
        .with_state(catalog_state);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(auth_router)
        .merge(account_router)
        .merge(public_catalog)
        .merge(protected_catalog)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "Storefront backend operational"
}
