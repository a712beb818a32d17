use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login - Verify credentials against the portal registry and
/// hand out a bearer token for the protected API.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let registry = auth::registry()?;

    let user = registry
        .verify(&payload.username, &payload.password)
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let claims = Claims::new(&payload.username, &user.name);
    let token = auth::generate_jwt(&claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    tracing::info!(user = %claims.sub, "login succeeded");

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "username": claims.sub,
            "name": user.name,
        },
        "expires_in": expires_in,
    })))
}

/// GET /api/auth/whoami - Echo the caller's identity and resolved area access.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let access = auth::registry()?.access_for(&user.username);

    Ok(ApiResponse::success(json!({
        "username": user.username,
        "name": user.display_name,
        "access": access,
    })))
}
