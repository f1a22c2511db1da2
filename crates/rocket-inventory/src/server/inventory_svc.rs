//! InventoryService gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use rocket_core::convert::parse_uuid;
use rocket_proto::v1::inventory_service_server::InventoryService;
use rocket_proto::v1::{GetPartRequest, GetPartResponse, ListPartsRequest, ListPartsResponse};

use super::convert::{filter_from_proto, part_to_proto};
use crate::service::PartService;

pub struct InventoryServiceImpl {
    parts: Arc<PartService>,
}

impl InventoryServiceImpl {
    pub const fn new(parts: Arc<PartService>) -> Self {
        Self { parts }
    }
}

#[tonic::async_trait]
impl InventoryService for InventoryServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "GetPart"))]
    async fn get_part(
        &self,
        request: Request<GetPartRequest>,
    ) -> Result<Response<GetPartResponse>, Status> {
        let part_uuid = parse_uuid(&request.get_ref().part_uuid, "part_uuid")?;
        let part = self.parts.get_part(part_uuid).await?;
        Ok(Response::new(GetPartResponse {
            part: Some(part_to_proto(&part)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "ListParts"))]
    async fn list_parts(
        &self,
        request: Request<ListPartsRequest>,
    ) -> Result<Response<ListPartsResponse>, Status> {
        let filter = request
            .into_inner()
            .filter
            .map(filter_from_proto)
            .transpose()?;
        let parts = self.parts.list_parts(filter.as_ref()).await?;
        Ok(Response::new(ListPartsResponse {
            parts: parts.iter().map(part_to_proto).collect(),
        }))
    }
}
