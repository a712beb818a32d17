pub mod areas;
pub mod auth;
pub mod projects;

use crate::auth::registry;
use crate::catalog::CatalogStore;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// A catalog store bound to the shared pool.
pub(crate) async fn store() -> Result<CatalogStore, ApiError> {
    Ok(CatalogStore::new(DatabaseManager::pool().await?))
}

/// Catalog mutations are limited to principals with unrestricted access.
pub(crate) fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    let access = registry()?.access_for(&user.username);
    if access.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "catalog management requires unrestricted area access",
        ))
    }
}
