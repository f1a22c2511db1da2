//! AuthService gRPC implementation (opaque sessions).

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use rocket_core::convert::parse_uuid;
use rocket_proto::v1::auth_service_server::AuthService;
use rocket_proto::v1::{
    LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, WhoamiRequest, WhoamiResponse,
};

use super::convert::{session_to_proto, user_to_proto};
use crate::service::SessionService;

pub struct AuthServiceImpl {
    sessions: Arc<SessionService>,
}

impl AuthServiceImpl {
    pub const fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "Login"))]
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        let session = self.sessions.login(&req.login, &req.password).await?;
        Ok(Response::new(LoginResponse {
            session_uuid: session.session_uuid.to_string(),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "Whoami"))]
    async fn whoami(
        &self,
        request: Request<WhoamiRequest>,
    ) -> Result<Response<WhoamiResponse>, Status> {
        let session_uuid = parse_uuid(&request.get_ref().session_uuid, "session_uuid")?;
        let (session, user) = self.sessions.whoami(session_uuid).await?;
        Ok(Response::new(WhoamiResponse {
            session: Some(session_to_proto(&session)),
            user: Some(user_to_proto(&user)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "Logout"))]
    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let session_uuid = parse_uuid(&request.get_ref().session_uuid, "session_uuid")?;
        self.sessions.logout(session_uuid).await?;
        Ok(Response::new(LogoutResponse {}))
    }
}
