//! JwtService gRPC implementation (access/refresh pairs).

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use rocket_core::convert::{parse_uuid, timestamp};
use rocket_proto::v1::jwt_service_server::JwtService;
use rocket_proto::v1::{
    GetAccessTokenRequest, GetAccessTokenResponse, GetRefreshTokenRequest,
    GetRefreshTokenResponse, JwtLoginRequest, JwtLoginResponse, RevokeAllForUserRequest,
    RevokeAllForUserResponse, RevokeTokenRequest, RevokeTokenResponse,
};

use super::convert::token_pair_to_proto;
use crate::service::TokenService;

pub struct JwtServiceImpl {
    tokens: Arc<TokenService>,
}

impl JwtServiceImpl {
    pub const fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[tonic::async_trait]
impl JwtService for JwtServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "JwtLogin"))]
    async fn login(
        &self,
        request: Request<JwtLoginRequest>,
    ) -> Result<Response<JwtLoginResponse>, Status> {
        let req = request.into_inner();
        let pair = self.tokens.login(&req.login, &req.password).await?;
        Ok(Response::new(JwtLoginResponse {
            tokens: Some(token_pair_to_proto(pair)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetAccessToken"))]
    async fn get_access_token(
        &self,
        request: Request<GetAccessTokenRequest>,
    ) -> Result<Response<GetAccessTokenResponse>, Status> {
        let issued = self
            .tokens
            .get_access_token(&request.get_ref().refresh_token)
            .await?;
        Ok(Response::new(GetAccessTokenResponse {
            access_token: issued.token,
            access_expires_at: Some(timestamp(issued.expires_at)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetRefreshToken"))]
    async fn get_refresh_token(
        &self,
        request: Request<GetRefreshTokenRequest>,
    ) -> Result<Response<GetRefreshTokenResponse>, Status> {
        let pair = self
            .tokens
            .get_refresh_token(&request.get_ref().refresh_token)
            .await?;
        Ok(Response::new(GetRefreshTokenResponse {
            tokens: Some(token_pair_to_proto(pair)),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "RevokeToken"))]
    async fn revoke_token(
        &self,
        request: Request<RevokeTokenRequest>,
    ) -> Result<Response<RevokeTokenResponse>, Status> {
        let revoked = self.tokens.revoke_token(&request.get_ref().token).await?;
        Ok(Response::new(RevokeTokenResponse { revoked }))
    }

    #[instrument(skip(self, request), fields(rpc = "RevokeAllForUser"))]
    async fn revoke_all_for_user(
        &self,
        request: Request<RevokeAllForUserRequest>,
    ) -> Result<Response<RevokeAllForUserResponse>, Status> {
        let req = request.into_inner();
        let user_uuid = parse_uuid(&req.user_uuid, "user_uuid")?;
        self.tokens
            .revoke_all_for_user(user_uuid, &req.access_token)
            .await?;
        Ok(Response::new(RevokeAllForUserResponse {}))
    }
}
