//! Part catalog queries with error mapping.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use rocket_core::db::DatabaseError;
use rocket_core::{ErrorCode, Result, ServiceError};

use crate::filter::PartsFilter;
use crate::model::Part;
use crate::repository::PartRepository;

fn database_error(e: DatabaseError) -> ServiceError {
    error!(error = %e, "Inventory storage failed");
    ErrorCode::DatabaseError.into()
}

pub struct PartService {
    repo: Arc<dyn PartRepository>,
}

impl PartService {
    pub fn new(repo: Arc<dyn PartRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_part(&self, part_uuid: Uuid) -> Result<Part> {
        self.repo
            .get_part(part_uuid)
            .await
            .map_err(database_error)?
            .ok_or_else(|| ErrorCode::PartNotFound.into())
    }

    /// `None` returns the whole catalog.
    pub async fn list_parts(&self, filter: Option<&PartsFilter>) -> Result<Vec<Part>> {
        let parts = self.repo.list_parts(filter).await.map_err(database_error)?;
        debug!(count = parts.len(), filtered = filter.is_some(), "Parts listed");
        Ok(parts)
    }
}
