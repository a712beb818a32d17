use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use super::model::{parse_links, Area, Project};

/// Errors surfaced by the catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Transport(#[from] sqlx::Error),
}

/// CRUD surface over the `areas` table. Project and sublink edits are not
/// store operations: callers fetch an area, transform its links document in
/// memory, and persist the whole document through [`replace_area`].
///
/// There is no optimistic-concurrency token. Two replaces derived from the
/// same snapshot race, and the later write's links document wins.
///
/// [`replace_area`]: CatalogStore::replace_area
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All areas, name ascending. The links column is read as text and
    /// decoded fail-soft: malformed stored documents come back as `[]`.
    pub async fn list_areas(&self) -> Result<Vec<Area>, StoreError> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT name, links::text FROM areas ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, raw)| Area {
                name,
                links: parse_links(raw.as_deref()),
            })
            .collect())
    }

    /// Insert a new area. Name uniqueness is enforced by the table, not
    /// pre-checked here; a duplicate surfaces as [`StoreError::Conflict`].
    pub async fn create_area(&self, name: &str, links: &[Project]) -> Result<(), StoreError> {
        let document = self.links_document(name, links)?;

        let result = sqlx::query("INSERT INTO areas (name, links) VALUES ($1, $2::jsonb)")
            .bind(name)
            .bind(&document)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                info!(area = name, "created area");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict(format!("area '{name}' already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace an area's full record, matching by `old_name` and setting both
    /// the name and the whole links document. A miss is reported as
    /// [`StoreError::NotFound`] by checking the affected-row count.
    pub async fn replace_area(
        &self,
        old_name: &str,
        new_name: &str,
        links: &[Project],
    ) -> Result<(), StoreError> {
        let document = self.links_document(new_name, links)?;

        let result = sqlx::query("UPDATE areas SET name = $1, links = $2::jsonb WHERE name = $3")
            .bind(new_name)
            .bind(&document)
            .bind(old_name)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound(format!(
                "area '{old_name}' does not exist"
            ))),
            Ok(_) => {
                info!(area = old_name, renamed_to = new_name, "replaced area");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
                "area '{new_name}' already exists"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an area by exact name. Deleting a name that does not exist is a
    /// silent no-op, not an error.
    pub async fn delete_area(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM areas WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        info!(area = name, "deleted area");
        Ok(())
    }

    fn links_document(&self, name: &str, links: &[Project]) -> Result<String, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation(
                "area name must not be empty".to_string(),
            ));
        }
        serde_json::to_string(links).map_err(|e| StoreError::Validation(e.to_string()))
    }
}

/// Postgres unique_violation, the only constraint the `areas` table carries.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_area_name_fails_validation() {
        let store = CatalogStore {
            pool: PgPool::connect_lazy("postgres://localhost/unused").unwrap(),
        };
        let err = store.links_document("  ", &[]).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn links_document_serializes_projects() {
        let store = CatalogStore {
            pool: PgPool::connect_lazy("postgres://localhost/unused").unwrap(),
        };
        let links = vec![Project {
            name: "Budgeting".to_string(),
            sublinks: vec![],
        }];
        let doc = store.links_document("Finance", &links).unwrap();
        assert_eq!(doc, r#"[{"name":"Budgeting","sublinks":[]}]"#);
    }
}
