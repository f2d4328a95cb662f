//! Catalog API Endpoints
//! Mission: Expose product CRUD over HTTP with multipart image upload

use crate::auth::models::Claims;
use crate::catalog::{
    images::{ImageError, ImageStore},
    models::{ListFilter, Product, ProductForm},
    store::ProductStore,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Shared catalog state
#[derive(Clone)]
pub struct CatalogState {
    pub products: Arc<ProductStore>,
    pub images: Arc<ImageStore>,
}

impl CatalogState {
    pub fn new(products: Arc<ProductStore>, images: Arc<ImageStore>) -> Self {
        Self { products, images }
    }
}

/// List products - GET /products
///
/// Anonymous callers only see active records; callers with a valid bearer
/// token (claims attached by the optional-auth layer) also see inactive ones.
pub async fn list_products(
    State(state): State<CatalogState>,
    claims: Option<Extension<Claims>>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Product>>, CatalogApiError> {
    let include_inactive = claims.is_some();

    let products = state
        .products
        .list(&filter, include_inactive)
        .map_err(|e| {
            warn!("Product listing failed: {}", e);
            CatalogApiError::InternalError
        })?;

    Ok(Json(products))
}

/// Fetch one active product - GET /products/:id
pub async fn get_product(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CatalogApiError> {
    // An unparsable id matches nothing.
    let id = Uuid::parse_str(&id).map_err(|_| CatalogApiError::NotFound)?;

    let product = state
        .products
        .get(&id, false)
        .map_err(|e| {
            warn!("Product fetch failed: {}", e);
            CatalogApiError::InternalError
        })?
        .ok_or(CatalogApiError::NotFound)?;

    Ok(Json(product))
}

/// Create product - POST /products (authenticated, multipart)
pub async fn create_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), CatalogApiError> {
    let upload = read_form(multipart).await?;

    // Field validation first, then the image. Nothing is persisted until
    // both pass.
    let mut draft = upload
        .form
        .into_new(None)
        .map_err(CatalogApiError::Validation)?;

    if let Some((bytes, content_type)) = upload.image {
        draft.image = Some(state.images.save(&bytes, &content_type)?);
    }

    let product = state.products.insert(&draft).map_err(|e| {
        warn!("Product insert failed: {}", e);
        CatalogApiError::InternalError
    })?;

    info!("Product {} created by {}", product.id, claims.username);

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update product - PUT /products/:id (authenticated, multipart)
///
/// Only the supplied fields are replaced; a new image replaces the stored
/// reference, otherwise the existing one is preserved.
pub async fn update_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, CatalogApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| CatalogApiError::NotFound)?;

    let upload = read_form(multipart).await?;

    let mut patch = upload
        .form
        .into_patch(None)
        .map_err(CatalogApiError::Validation)?;

    if let Some((bytes, content_type)) = upload.image {
        patch.image = Some(state.images.save(&bytes, &content_type)?);
    }

    let product = state
        .products
        .update(&id, &patch)
        .map_err(|e| {
            warn!("Product update failed: {}", e);
            CatalogApiError::InternalError
        })?
        .ok_or(CatalogApiError::NotFound)?;

    info!("Product {} updated by {}", product.id, claims.username);

    Ok(Json(product))
}

/// Soft-delete product - DELETE /products/:id (authenticated)
pub async fn delete_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, CatalogApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| CatalogApiError::NotFound)?;

    let deleted = state.products.soft_delete(&id).map_err(|e| {
        warn!("Product delete failed: {}", e);
        CatalogApiError::InternalError
    })?;

    if !deleted {
        return Err(CatalogApiError::NotFound);
    }

    info!("Product {} soft-deleted by {}", id, claims.username);

    Ok(StatusCode::NO_CONTENT)
}

struct ParsedUpload {
    form: ProductForm,
    image: Option<(Vec<u8>, String)>,
}

/// Drain a multipart form into text fields plus an optional `image` part.
async fn read_form(mut multipart: Multipart) -> Result<ParsedUpload, CatalogApiError> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| CatalogApiError::Validation("Malformed multipart body".to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let content_type = field.content_type().map(str::to_string).unwrap_or_default();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| CatalogApiError::Validation("Malformed multipart body".to_string()))?;
            image = Some((bytes.to_vec(), content_type));
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| CatalogApiError::Validation("Malformed multipart body".to_string()))?;
            form.set_field(&name, value);
        }
    }

    Ok(ParsedUpload { form, image })
}

/// Catalog API errors
#[derive(Debug)]
pub enum CatalogApiError {
    Validation(String),
    NotFound,
    InternalError,
}

impl From<ImageError> for CatalogApiError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::UnsupportedType(_) | ImageError::TooLarge(_) => {
                CatalogApiError::Validation(e.to_string())
            }
            ImageError::Io(err) => {
                warn!("Image storage failed: {}", err);
                CatalogApiError::InternalError
            }
        }
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CatalogApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            CatalogApiError::NotFound => (StatusCode::NOT_FOUND, "Product not found".to_string()),
            CatalogApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
