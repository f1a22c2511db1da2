#![allow(clippy::unwrap_used)]

use uuid::Uuid;

use super::InventoryDatabase;
use crate::filter::PartsFilter;
use crate::model::{Category, MetadataValue};
use crate::repository::PartRepository;
use crate::seed::demo_catalog;

#[tokio::test]
async fn parts_roundtrip_with_nested_fields() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    let catalog = demo_catalog(1_700_000_000);
    db.save_parts(&catalog).await.unwrap();

    for part in &catalog {
        let stored = db.fetch_part(part.part_uuid).await.unwrap().unwrap();
        assert_eq!(&stored, part);
    }
    assert_eq!(db.count_parts().await.unwrap(), catalog.len() as u64);
}

#[tokio::test]
async fn missing_part_is_none() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    assert!(db.fetch_part(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_applies_filter() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    db.save_parts(&demo_catalog(0)).await.unwrap();

    let filter = PartsFilter {
        categories: [Category::Engine].into(),
        ..PartsFilter::default()
    };
    let engines = db.list_parts(Some(&filter)).await.unwrap();
    assert!(!engines.is_empty());
    assert!(engines.iter().all(|p| p.category == Category::Engine));
}

#[tokio::test]
async fn id_filter_only_loads_requested_rows() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    let catalog = demo_catalog(0);
    db.save_parts(&catalog).await.unwrap();

    let wanted = [catalog[0].part_uuid, catalog[1].part_uuid];
    let rows = db.fetch_parts_by_ids(&wanted).await.unwrap();
    assert_eq!(rows.len(), 2);

    let filter = PartsFilter::by_ids(wanted.into_iter().chain([Uuid::new_v4()]));
    let listed = db.list_parts(Some(&filter)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| wanted.contains(&p.part_uuid)));

    let narrowed = PartsFilter {
        categories: [catalog[0].category].into(),
        ..PartsFilter::by_ids(wanted)
    };
    let listed = db.list_parts(Some(&narrowed)).await.unwrap();
    assert!(listed.iter().all(|p| p.category == catalog[0].category));
    assert!(listed.iter().any(|p| p.part_uuid == catalog[0].part_uuid));
}

#[tokio::test]
async fn large_id_filter_spans_several_queries() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    let catalog = demo_catalog(0);
    db.save_parts(&catalog).await.unwrap();

    let mut ids: Vec<Uuid> = (0..1_200).map(|_| Uuid::new_v4()).collect();
    ids.push(catalog[0].part_uuid);
    let listed = db
        .list_parts(Some(&PartsFilter::by_ids(ids)))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].part_uuid, catalog[0].part_uuid);
}

#[tokio::test]
async fn save_replaces_existing_rows() {
    let db = InventoryDatabase::open_in_memory().await.unwrap();
    let mut part = demo_catalog(0).remove(0);
    db.save_parts(std::slice::from_ref(&part)).await.unwrap();

    part.metadata
        .insert("revision".into(), MetadataValue::Int64(2));
    db.save_parts(std::slice::from_ref(&part)).await.unwrap();

    assert_eq!(db.count_parts().await.unwrap(), 1);
    let stored = db.fetch_part(part.part_uuid).await.unwrap().unwrap();
    assert_eq!(stored.metadata["revision"], MetadataValue::Int64(2));
}
