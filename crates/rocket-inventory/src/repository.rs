//! Part repository contract and its in-memory variant.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use rocket_core::db::DatabaseError;

use crate::filter::{PartsFilter, apply};
use crate::model::Part;

/// Read access to the part catalog plus bulk loading for seeding.
#[tonic::async_trait]
pub trait PartRepository: Send + Sync {
    async fn get_part(&self, part_uuid: Uuid) -> Result<Option<Part>, DatabaseError>;

    /// Parts matching `filter`, ordered by name then id.
    async fn list_parts(&self, filter: Option<&PartsFilter>) -> Result<Vec<Part>, DatabaseError>;

    /// Insert or replace parts by id.
    async fn upsert_parts(&self, parts: &[Part]) -> Result<(), DatabaseError>;

    async fn count(&self) -> Result<u64, DatabaseError>;
}

pub(crate) fn sort_parts(parts: &mut [Part]) {
    parts.sort_by(|a, b| a.name.cmp(&b.name).then(a.part_uuid.cmp(&b.part_uuid)));
}

/// Map-backed catalog guarded by a reader/writer lock.
#[derive(Default)]
pub struct InMemoryPartRepository {
    parts: RwLock<HashMap<Uuid, Part>>,
}

impl InMemoryPartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            parts: RwLock::new(parts.into_iter().map(|p| (p.part_uuid, p)).collect()),
        }
    }
}

#[tonic::async_trait]
impl PartRepository for InMemoryPartRepository {
    async fn get_part(&self, part_uuid: Uuid) -> Result<Option<Part>, DatabaseError> {
        Ok(self.parts.read().await.get(&part_uuid).cloned())
    }

    async fn list_parts(&self, filter: Option<&PartsFilter>) -> Result<Vec<Part>, DatabaseError> {
        let mut parts = apply(self.parts.read().await.values(), filter);
        sort_parts(&mut parts);
        Ok(parts)
    }

    async fn upsert_parts(&self, parts: &[Part]) -> Result<(), DatabaseError> {
        let mut map = self.parts.write().await;
        for part in parts {
            map.insert(part.part_uuid, part.clone());
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.parts.read().await.len() as u64)
    }
}
