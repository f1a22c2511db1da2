//! IAM gRPC client used by the HTTP session guard.

use std::time::Duration;

use tonic::transport::Channel;

use rocket_proto::v1::WhoamiRequest;
use rocket_proto::v1::auth_service_client::AuthServiceClient;

use super::{ClientError, IamClient, SessionIdentity, lazy_channel, response_uuid};

#[derive(Clone)]
pub struct GrpcIamClient {
    client: AuthServiceClient<Channel>,
}

impl GrpcIamClient {
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: AuthServiceClient::new(lazy_channel(addr, timeout)?),
        })
    }
}

#[tonic::async_trait]
impl IamClient for GrpcIamClient {
    async fn whoami(&self, session_uuid: &str) -> Result<SessionIdentity, ClientError> {
        let response = self
            .client
            .clone()
            .whoami(WhoamiRequest {
                session_uuid: session_uuid.to_string(),
            })
            .await?
            .into_inner();

        let session = response
            .session
            .ok_or_else(|| ClientError::InvalidResponse("missing session".into()))?;
        let user = response
            .user
            .ok_or_else(|| ClientError::InvalidResponse("missing user".into()))?;

        Ok(SessionIdentity {
            session_uuid: response_uuid(&session.session_uuid, "session_uuid")?,
            user_uuid: response_uuid(&user.user_uuid, "user_uuid")?,
            login: user.info.map(|info| info.login).unwrap_or_default(),
        })
    }
}
