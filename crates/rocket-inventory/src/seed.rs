//! Catalog seeding: a built-in demo catalog or a JSON file.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;
use uuid::Uuid;

use rocket_core::db::{DatabaseError, unix_timestamp};

use crate::model::{Category, Dimensions, Manufacturer, MetadataValue, Part};
use crate::repository::PartRepository;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("catalog part {0} has a negative price")]
    NegativePrice(Uuid),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Where the initial catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    None,
    Demo,
    File(std::path::PathBuf),
}

#[allow(clippy::too_many_arguments)]
fn demo_part(
    id: u128,
    name: &str,
    description: &str,
    price: f64,
    stock_quantity: i64,
    category: Category,
    manufacturer: (&str, &str, &str),
    tags: &[&str],
    metadata: Vec<(&str, MetadataValue)>,
    now: i64,
) -> Part {
    Part {
        part_uuid: Uuid::from_u128(id),
        name: name.into(),
        description: description.into(),
        price,
        stock_quantity,
        category,
        dimensions: Dimensions {
            length: 1.0,
            width: 1.0,
            height: 1.0,
            weight: 1.0,
        },
        manufacturer: Manufacturer {
            name: manufacturer.0.into(),
            country: manufacturer.1.into(),
            website: manufacturer.2.into(),
        },
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        metadata: metadata
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
        created_at: now,
        updated_at: now,
    }
}

/// Built-in catalog with stable ids, one or more parts per category.
pub fn demo_catalog(now: i64) -> Vec<Part> {
    vec![
        demo_part(
            0x5a1e_0001_0000_4000_8000_0000_0000_0001,
            "Raptor Engine",
            "Full-flow staged combustion methane engine",
            100.0,
            12,
            Category::Engine,
            ("SpaceWorks", "USA", "https://spaceworks.example"),
            &["reusable", "methane"],
            vec![
                ("thrust_kn", MetadataValue::Int64(2_300)),
                ("throttleable", MetadataValue::Bool(true)),
            ],
            now,
        ),
        demo_part(
            0x5a1e_0001_0000_4000_8000_0000_0000_0002,
            "RD-180",
            "Dual-chamber kerosene engine",
            200.0,
            4,
            Category::Engine,
            ("NPO Energomash", "Russia", ""),
            &["kerosene"],
            vec![("chambers", MetadataValue::Int64(2))],
            now,
        ),
        demo_part(
            0x5a1e_0001_0000_4000_8000_0000_0000_0003,
            "LOX Tank",
            "Insulated liquid oxygen tank",
            50.0,
            30,
            Category::Fuel,
            ("SpaceWorks", "USA", "https://spaceworks.example"),
            &["cryogenic"],
            vec![("capacity_l", MetadataValue::Float64(1_250.5))],
            now,
        ),
        demo_part(
            0x5a1e_0001_0000_4000_8000_0000_0000_0004,
            "Quartz Porthole",
            "Triple-pane fused quartz window",
            75.0,
            18,
            Category::Porthole,
            ("Glasbau", "Germany", "https://glasbau.example"),
            &["crew"],
            vec![("material", MetadataValue::String("fused quartz".into()))],
            now,
        ),
        demo_part(
            0x5a1e_0001_0000_4000_8000_0000_0000_0005,
            "Delta Wing",
            "Carbon composite delta wing",
            320.0,
            6,
            Category::Wing,
            ("Glasbau", "Germany", "https://glasbau.example"),
            &["reusable"],
            vec![],
            now,
        ),
    ]
}

/// Read a JSON array of parts.
pub fn load_catalog(path: &Path) -> Result<Vec<Part>, SeedError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: display.clone(),
        source,
    })?;
    let parts: Vec<Part> = serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: display,
        source,
    })?;
    if let Some(bad) = parts.iter().find(|p| p.price < 0.0) {
        return Err(SeedError::NegativePrice(bad.part_uuid));
    }
    Ok(parts)
}

/// Populate an empty repository. Returns how many parts were written.
pub async fn seed_if_empty(
    repo: &dyn PartRepository,
    source: &SeedSource,
) -> Result<usize, SeedError> {
    if *source == SeedSource::None || repo.count().await? > 0 {
        return Ok(0);
    }

    let parts = match source {
        SeedSource::None => return Ok(0),
        SeedSource::Demo => demo_catalog(unix_timestamp()),
        SeedSource::File(path) => load_catalog(path)?,
    };
    repo.upsert_parts(&parts).await?;
    info!(count = parts.len(), "Inventory catalog seeded");
    Ok(parts.len())
}
