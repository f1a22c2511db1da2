//! Tests for the `InventoryService` gRPC implementation.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tonic::{Code, Request};
use uuid::Uuid;

use rocket_proto::v1::inventory_service_server::InventoryService;
use rocket_proto::v1::{self, GetPartRequest, ListPartsRequest, PartsFilter};

use super::InventoryServiceImpl;
use crate::repository::InMemoryPartRepository;
use crate::seed::demo_catalog;
use crate::service::PartService;

fn setup() -> InventoryServiceImpl {
    let repo = InMemoryPartRepository::with_parts(demo_catalog(0));
    InventoryServiceImpl::new(Arc::new(PartService::new(Arc::new(repo))))
}

async fn list(svc: &InventoryServiceImpl, filter: Option<PartsFilter>) -> Vec<v1::Part> {
    svc.list_parts(Request::new(ListPartsRequest { filter }))
        .await
        .unwrap()
        .into_inner()
        .parts
}

#[tokio::test]
async fn get_part_by_id() {
    let svc = setup();
    let expected = &demo_catalog(0)[0];
    let part = svc
        .get_part(Request::new(GetPartRequest {
            part_uuid: expected.part_uuid.to_string(),
        }))
        .await
        .unwrap()
        .into_inner()
        .part
        .unwrap();
    assert_eq!(part.name, expected.name);
    assert_eq!(part.metadata.len(), expected.metadata.len());
}

#[tokio::test]
async fn get_part_errors() {
    let svc = setup();
    let err = svc
        .get_part(Request::new(GetPartRequest {
            part_uuid: Uuid::new_v4().to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);

    let err = svc
        .get_part(Request::new(GetPartRequest {
            part_uuid: "bogus".into(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn nil_filter_lists_everything() {
    let svc = setup();
    assert_eq!(list(&svc, None).await.len(), demo_catalog(0).len());
}

#[tokio::test]
async fn filter_fields_combine() {
    let svc = setup();
    let parts = list(
        &svc,
        Some(PartsFilter {
            manufacturer_countries: vec!["USA".into()],
            tags: vec!["reusable".into(), "cryogenic".into()],
            ..Default::default()
        }),
    )
    .await;
    let mut names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["LOX Tank", "Raptor Engine"]);
}

#[tokio::test]
async fn id_filter_with_unknown_ids_returns_subset() {
    let svc = setup();
    let known = demo_catalog(0)[1].part_uuid.to_string();
    let parts = list(
        &svc,
        Some(PartsFilter {
            part_uuids: vec![known.clone(), Uuid::new_v4().to_string()],
            ..Default::default()
        }),
    )
    .await;
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].part_uuid, known);
}
