pub mod access;
pub mod model;
pub mod store;

pub use access::AreaAccess;
pub use model::{Area, Project, Sublink};
pub use store::{CatalogStore, StoreError};
