use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::accounts::Accounts;
use crate::api::{MessageResponse, ProductResponse, ProductsResponse, UserResponse};
use crate::catalog::Catalog;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::{NewProduct, ProductPatch, SignIn};
use crate::photos::{PhotoUpload, SharedPhotoHost, UploadOutcome, upload_all};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// `None` when no object storage is configured; photo uploads then answer 503.
    pub photos: Option<SharedPhotoHost>,
}

const NOT_FOUND_FOR_OWNER: &str = "No products found for this Google ID";
const NOT_FOUND_OR_NOT_OWNED: &str = "Product not found or Google ID does not match";

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            info!(error = %rejection, "rejected request body");
            Err(ApiError::Validation("Missing required fields in request body".to_string()))
        }
    }
}

/// Updates have no required fields, so a missing or non-JSON body is an empty patch.
fn patch_body(headers: &HeaderMap, body: &Bytes) -> Result<ProductPatch, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ProductPatch::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        info!(error = %e, "rejected update body");
        ApiError::Validation("Malformed JSON in request body".to_string())
    })
}

/// Ids are row ids; anything that does not parse cannot match a product.
fn owned_key(
    path: Result<Path<(String, String)>, PathRejection>,
    missing: &'static str,
) -> Result<(String, i64), ApiError> {
    let Ok(Path((owner_id, id))) = path else {
        return Err(ApiError::NotFound(missing));
    };
    let id = id.parse::<i64>().map_err(|_| ApiError::NotFound(missing))?;
    Ok((owner_id, id))
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    "API is running..."
}

pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignIn>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = json_body(body)?.validate()?;
    let (user, created) = Accounts::new(state.db.connection()).sign_in(input).await?;

    info!(external_id = %user.external_id, created, "user authenticated");
    let response = UserResponse {
        message: "User authenticated".to_string(),
        user,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = json_body(body)?.validate()?;
    let product = Catalog::new(state.db.connection()).create(input).await?;

    info!(id = product.id, owner = %product.owner_id, "product saved");
    let response = ProductResponse {
        message: "Product saved successfully".to_string(),
        product,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// An owner without products gets a 404 rather than an empty list.
pub async fn list_products(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Response, ApiError> {
    let products = Catalog::new(state.db.connection()).list_by_owner(&owner_id).await?;

    if products.is_empty() {
        return Err(ApiError::NotFound(NOT_FOUND_FOR_OWNER));
    }

    info!(owner = %owner_id, count = products.len(), "got products");
    Ok((StatusCode::OK, Json(ProductsResponse { products })).into_response())
}

pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let (owner_id, id) = owned_key(path, NOT_FOUND_FOR_OWNER)?;

    match Catalog::new(state.db.connection()).get_owned(&owner_id, id).await? {
        Some(product) => Ok((StatusCode::OK, Json(ProductsResponse { products: vec![product] })).into_response()),
        None => Err(ApiError::NotFound(NOT_FOUND_FOR_OWNER)),
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (owner_id, id) = owned_key(path, NOT_FOUND_OR_NOT_OWNED)?;
    let patch = patch_body(&headers, &body)?.validate()?;

    match Catalog::new(state.db.connection()).update_owned(&owner_id, id, patch).await? {
        Some(product) => {
            info!(id, owner = %owner_id, "product updated");
            let response = ProductResponse {
                message: "Product updated successfully".to_string(),
                product,
            };
            Ok((StatusCode::OK, Json(response)).into_response())
        }
        None => Err(ApiError::NotFound(NOT_FOUND_OR_NOT_OWNED)),
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let (owner_id, id) = owned_key(path, NOT_FOUND_OR_NOT_OWNED)?;

    match Catalog::new(state.db.connection()).delete_owned(&owner_id, id).await? {
        Some(_) => {
            info!(id, owner = %owner_id, "product deleted");
            Ok((StatusCode::OK, Json(MessageResponse::new("Product deleted successfully"))).into_response())
        }
        None => Err(ApiError::NotFound(NOT_FOUND_OR_NOT_OWNED)),
    }
}

fn malformed() -> ApiError {
    ApiError::Validation("Malformed multipart body".to_string())
}

/// Splits a multipart photo batch into the `existing` count and the file fields.
/// Fields that are neither are skipped.
pub async fn read_photo_batch(multipart: &mut Multipart) -> Result<(usize, Vec<PhotoUpload>), ApiError> {
    let mut existing = 0usize;
    let mut uploads = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("failed to read multipart field: {}", e);
                return Err(malformed());
            }
        };

        if field.name() == Some("existing") {
            let text = field.text().await.map_err(|_| malformed())?;
            existing = text
                .trim()
                .parse()
                .map_err(|_| ApiError::Validation(format!("Invalid photo count: {text}")))?;
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation(format!("Could not read {file_name}")))?;

        info!("received photo: {} ({} bytes)", file_name, data.len());
        uploads.push(PhotoUpload::new(&file_name, content_type.as_deref(), data.to_vec()));
    }

    Ok((existing, uploads))
}

/// Multipart photo batch. File fields are photos; an optional `existing` text
/// field carries how many photos the listing already has.
pub async fn upload_photos(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadOutcome>, ApiError> {
    let Some(host) = state.photos.clone() else {
        return Err(ApiError::Unavailable("Photo storage is not configured"));
    };

    let (existing, uploads) = read_photo_batch(&mut multipart).await?;
    let outcome = upload_all(&*host, existing, uploads).await?;
    Ok(Json(outcome))
}
