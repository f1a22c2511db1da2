//! Row mapping for the `parts` table.

use std::collections::BTreeMap;

use uuid::Uuid;

use rocket_core::db::DatabaseError;

use crate::model::{Category, Dimensions, Manufacturer, MetadataValue, Part};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartRow {
    pub part_uuid: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub category: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub manufacturer_name: String,
    pub manufacturer_country: String,
    pub manufacturer_website: String,
    pub tags: String,
    pub metadata: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn corrupt(column: &str, e: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::Query(format!("corrupt {column}: {e}"))
}

impl TryFrom<PartRow> for Part {
    type Error = DatabaseError;

    fn try_from(row: PartRow) -> Result<Self, Self::Error> {
        let tags: Vec<String> = serde_json::from_str(&row.tags).map_err(|e| corrupt("tags", e))?;
        let metadata: BTreeMap<String, MetadataValue> =
            serde_json::from_str(&row.metadata).map_err(|e| corrupt("metadata", e))?;

        Ok(Self {
            part_uuid: Uuid::parse_str(&row.part_uuid).map_err(|e| corrupt("part_uuid", e))?,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            category: row
                .category
                .parse::<Category>()
                .map_err(|e| corrupt("category", e))?,
            dimensions: Dimensions {
                length: row.length,
                width: row.width,
                height: row.height,
                weight: row.weight,
            },
            manufacturer: Manufacturer {
                name: row.manufacturer_name,
                country: row.manufacturer_country,
                website: row.manufacturer_website,
            },
            tags,
            metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
