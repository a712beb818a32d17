use axum::extract::{Extension, Json, Path};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::registry;
use crate::catalog::model::links_from_input;
use crate::catalog::Area;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{require_admin, store};

#[derive(Debug, Deserialize)]
pub struct CreateAreaPayload {
    pub name: String,
    /// Links document: inline JSON array, or the raw text of a form field.
    /// Omitted means the area starts empty.
    #[serde(default)]
    pub links: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceAreaPayload {
    /// New area name; send the current name to keep it.
    pub name: String,
    pub links: Value,
}

/// GET /api/areas - Areas visible to the caller, name ascending.
pub async fn list(Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Area>> {
    let access = registry()?.access_for(&user.username);
    let areas = store().await?.list_areas().await?;
    Ok(ApiResponse::success(access.filter(areas)))
}

/// POST /api/areas - Create an area (admin only).
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAreaPayload>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let links = payload
        .links
        .map(links_from_input)
        .transpose()?
        .unwrap_or_default();

    store().await?.create_area(&payload.name, &links).await?;

    Ok(ApiResponse::created(json!({ "name": payload.name })))
}

/// PUT /api/areas/:name - Replace an area's full record: rename and swap the
/// whole links document (admin only). 404 when the name does not exist.
pub async fn replace(
    Path(name): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReplaceAreaPayload>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let links = links_from_input(payload.links)?;
    store()
        .await?
        .replace_area(&name, &payload.name, &links)
        .await?;

    Ok(ApiResponse::success(json!({ "name": payload.name })))
}

/// DELETE /api/areas/:name - Delete an area by exact name (admin only).
/// Deleting a nonexistent name still succeeds.
pub async fn remove(
    Path(name): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    store().await?.delete_area(&name).await?;

    Ok(ApiResponse::success(json!({ "deleted": name })))
}
