//! UserService gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use rocket_core::convert::parse_uuid;
use rocket_core::{ErrorCode, ServiceError};
use rocket_proto::v1::user_service_server::UserService as UserServiceRpc;
use rocket_proto::v1::{GetUserRequest, GetUserResponse, RegisterRequest, RegisterResponse};

use super::convert::{notification_methods_from_proto, user_to_proto};
use crate::model::NewUser;
use crate::service::UserService;

pub struct UserServiceImpl {
    users: Arc<UserService>,
}

impl UserServiceImpl {
    pub const fn new(users: Arc<UserService>) -> Self {
        Self { users }
    }
}

#[tonic::async_trait]
impl UserServiceRpc for UserServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "Register"))]
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        let info = req
            .info
            .ok_or_else(|| ServiceError::new(ErrorCode::InvalidArgument, "info is required"))?;

        let user = self
            .users
            .register(NewUser {
                login: info.login,
                email: info.email,
                password: req.password,
                notification_methods: notification_methods_from_proto(info.notification_methods),
            })
            .await?;

        Ok(Response::new(RegisterResponse {
            user_uuid: user.user_uuid.to_string(),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetUser"))]
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let user_uuid = parse_uuid(&request.get_ref().user_uuid, "user_uuid")?;
        let user = self.users.get_user(user_uuid).await?;
        Ok(Response::new(GetUserResponse {
            user: Some(user_to_proto(&user)),
        }))
    }
}
