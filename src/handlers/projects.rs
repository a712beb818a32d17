//! Project-level edits are not store operations: each handler fetches the
//! owning area, transforms its links document in memory, and writes the
//! whole document back. Two concurrent edits to the same area race; the
//! later replace wins and the earlier change is overwritten.

use axum::extract::{Extension, Json, Path};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::model::{self, sublinks_from_input, Project};
use crate::catalog::{Area, CatalogStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{require_admin, store};

#[derive(Debug, Deserialize)]
pub struct AddProjectPayload {
    pub name: String,
    /// Sublinks: inline JSON array, or raw form-field text. Omitted means
    /// the project starts without sublinks.
    #[serde(default)]
    pub sublinks: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectPayload {
    /// New project name; send the current name to keep it.
    pub name: String,
    pub sublinks: Value,
}

/// The area must exist in a freshly fetched listing; a stale name is the
/// caller's 404, not the store's.
async fn find_area(store: &CatalogStore, name: &str) -> Result<Area, ApiError> {
    let areas = store.list_areas().await?;
    areas
        .into_iter()
        .find(|area| area.name == name)
        .ok_or_else(|| ApiError::not_found(format!("area '{name}' not found")))
}

/// POST /api/areas/:area/projects - Append a project to an area's links
/// document (admin only).
pub async fn add(
    Path(area): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddProjectPayload>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let sublinks = payload
        .sublinks
        .map(sublinks_from_input)
        .transpose()?
        .unwrap_or_default();

    let store = store().await?;
    let mut target = find_area(&store, &area).await?;
    model::add_project(
        &mut target.links,
        Project {
            name: payload.name.clone(),
            sublinks,
        },
    );
    store
        .replace_area(&target.name, &target.name, &target.links)
        .await?;

    Ok(ApiResponse::created(json!({
        "area": area,
        "project": payload.name,
    })))
}

/// PUT /api/areas/:area/projects/:project - Rename a project and replace its
/// sublinks (admin only). 404 when the project is absent from the area.
pub async fn update(
    Path((area, project)): Path<(String, String)>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProjectPayload>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let sublinks = sublinks_from_input(payload.sublinks)?;

    let store = store().await?;
    let mut target = find_area(&store, &area).await?;
    if !model::update_project(&mut target.links, &project, &payload.name, &sublinks) {
        return Err(ApiError::not_found(format!(
            "project '{project}' not found in area '{area}'"
        )));
    }
    store
        .replace_area(&target.name, &target.name, &target.links)
        .await?;

    Ok(ApiResponse::success(json!({
        "area": area,
        "project": payload.name,
    })))
}

/// DELETE /api/areas/:area/projects/:project - Drop every project matching
/// the name (admin only). Removing a name that is not present still writes
/// the unchanged document and succeeds, like area deletion.
pub async fn remove(
    Path((area, project)): Path<(String, String)>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let store = store().await?;
    let mut target = find_area(&store, &area).await?;
    let removed = model::remove_project(&mut target.links, &project);
    store
        .replace_area(&target.name, &target.name, &target.links)
        .await?;

    Ok(ApiResponse::success(json!({
        "area": area,
        "project": project,
        "removed": removed,
    })))
}
