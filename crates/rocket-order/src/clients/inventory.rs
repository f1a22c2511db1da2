//! Inventory gRPC client.

use std::time::Duration;

use tonic::transport::Channel;
use tracing::debug;
use uuid::Uuid;

use rocket_proto::v1::inventory_service_client::InventoryServiceClient;
use rocket_proto::v1::{ListPartsRequest, PartsFilter};

use super::{CatalogPart, ClientError, InventoryClient, lazy_channel, response_uuid};

#[derive(Clone)]
pub struct GrpcInventoryClient {
    client: InventoryServiceClient<Channel>,
}

impl GrpcInventoryClient {
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: InventoryServiceClient::new(lazy_channel(addr, timeout)?),
        })
    }
}

#[tonic::async_trait]
impl InventoryClient for GrpcInventoryClient {
    async fn list_parts(&self, part_uuids: &[Uuid]) -> Result<Vec<CatalogPart>, ClientError> {
        let request = ListPartsRequest {
            filter: Some(PartsFilter {
                part_uuids: part_uuids.iter().map(Uuid::to_string).collect(),
                ..PartsFilter::default()
            }),
        };

        let parts = self
            .client
            .clone()
            .list_parts(request)
            .await?
            .into_inner()
            .parts;
        debug!(requested = part_uuids.len(), found = parts.len(), "Inventory parts fetched");

        parts
            .into_iter()
            .map(|p| {
                Ok(CatalogPart {
                    part_uuid: response_uuid(&p.part_uuid, "part_uuid")?,
                    name: p.name,
                    price: p.price,
                })
            })
            .collect()
    }
}
