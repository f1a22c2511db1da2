//! Part catalog queries.

use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use super::db::InventoryDatabase;
use super::models::PartRow;
use crate::filter::{PartsFilter, apply};
use crate::model::Part;
use crate::repository::{PartRepository, sort_parts};
use rocket_core::db::DatabaseError;

/// Ids bound per `IN (...)` query, well under SQLite's variable limit.
const ID_CHUNK: usize = 500;

impl InventoryDatabase {
    // =========================================================================
    // Parts
    // =========================================================================

    pub async fn fetch_part(&self, part_uuid: Uuid) -> Result<Option<Part>, DatabaseError> {
        sqlx::query_as::<_, PartRow>("SELECT * FROM parts WHERE part_uuid = ?")
            .bind(part_uuid.to_string())
            .fetch_optional(self.pool())
            .await?
            .map(Part::try_from)
            .transpose()
    }

    pub async fn fetch_all_parts(&self) -> Result<Vec<Part>, DatabaseError> {
        sqlx::query_as::<_, PartRow>("SELECT * FROM parts ORDER BY name ASC, part_uuid ASC")
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(Part::try_from)
            .collect()
    }

    /// Fetch only the rows whose id is in `part_uuids`.
    pub async fn fetch_parts_by_ids<'a>(
        &self,
        part_uuids: impl IntoIterator<Item = &'a Uuid>,
    ) -> Result<Vec<Part>, DatabaseError> {
        let ids: Vec<String> = part_uuids.into_iter().map(Uuid::to_string).collect();
        let mut parts = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let mut query =
                QueryBuilder::<Sqlite>::new("SELECT * FROM parts WHERE part_uuid IN (");
            let mut list = query.separated(", ");
            for id in chunk {
                list.push_bind(id.as_str());
            }
            list.push_unseparated(")");

            for row in query
                .build_query_as::<PartRow>()
                .fetch_all(self.pool())
                .await?
            {
                parts.push(Part::try_from(row)?);
            }
        }
        Ok(parts)
    }

    /// Insert or replace a batch of parts in one transaction.
    pub async fn save_parts(&self, parts: &[Part]) -> Result<(), DatabaseError> {
        let mut tx = self.pool().begin().await?;
        for part in parts {
            let tags = serde_json::to_string(&part.tags)
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            let metadata = serde_json::to_string(&part.metadata)
                .map_err(|e| DatabaseError::Query(e.to_string()))?;

            sqlx::query(
                "INSERT OR REPLACE INTO parts (part_uuid, name, description, price, stock_quantity, \
                 category, length, width, height, weight, manufacturer_name, manufacturer_country, \
                 manufacturer_website, tags, metadata, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(part.part_uuid.to_string())
            .bind(&part.name)
            .bind(&part.description)
            .bind(part.price)
            .bind(part.stock_quantity)
            .bind(part.category.as_str())
            .bind(part.dimensions.length)
            .bind(part.dimensions.width)
            .bind(part.dimensions.height)
            .bind(part.dimensions.weight)
            .bind(&part.manufacturer.name)
            .bind(&part.manufacturer.country)
            .bind(&part.manufacturer.website)
            .bind(tags)
            .bind(metadata)
            .bind(part.created_at)
            .bind(part.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn count_parts(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM parts")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[tonic::async_trait]
impl PartRepository for InventoryDatabase {
    async fn get_part(&self, part_uuid: Uuid) -> Result<Option<Part>, DatabaseError> {
        self.fetch_part(part_uuid).await
    }

    async fn list_parts(&self, filter: Option<&PartsFilter>) -> Result<Vec<Part>, DatabaseError> {
        let rows = match filter {
            Some(f) if !f.part_uuids.is_empty() => self.fetch_parts_by_ids(&f.part_uuids).await?,
            _ => self.fetch_all_parts().await?,
        };
        let mut parts = apply(&rows, filter);
        sort_parts(&mut parts);
        Ok(parts)
    }

    async fn upsert_parts(&self, parts: &[Part]) -> Result<(), DatabaseError> {
        self.save_parts(parts).await
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        self.count_parts().await
    }
}
