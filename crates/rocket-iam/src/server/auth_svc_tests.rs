//! Tests for the `AuthService` gRPC implementation.
#![allow(clippy::unwrap_used)]

use tonic::{Code, Request};
use uuid::Uuid;

use rocket_core::db::unix_timestamp;
use rocket_proto::v1::auth_service_server::AuthService;
use rocket_proto::v1::{LoginRequest, LogoutRequest, WhoamiRequest};

use super::test_helpers::{LOGIN, PASSWORD, error_code, register_default, setup};
use crate::model::Session;
use crate::repository::SessionRepository;

fn login_request(login: &str, password: &str) -> Request<LoginRequest> {
    Request::new(LoginRequest {
        login: login.into(),
        password: password.into(),
    })
}

#[tokio::test]
async fn login_whoami_logout() {
    let iam = setup().await;
    let user_uuid = register_default(&iam).await;
    let svc = iam.auth_service();

    let session_uuid = svc
        .login(login_request(LOGIN, PASSWORD))
        .await
        .unwrap()
        .into_inner()
        .session_uuid;

    let who = svc
        .whoami(Request::new(WhoamiRequest {
            session_uuid: session_uuid.clone(),
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(who.user.unwrap().user_uuid, user_uuid);
    let session = who.session.unwrap();
    assert_eq!(session.session_uuid, session_uuid);
    assert!(session.expires_at.unwrap().seconds > session.created_at.unwrap().seconds);

    svc.logout(Request::new(LogoutRequest {
        session_uuid: session_uuid.clone(),
    }))
    .await
    .unwrap();

    let err = svc
        .whoami(Request::new(WhoamiRequest { session_uuid }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
    assert_eq!(error_code(&err), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn unknown_login_and_wrong_password_look_the_same() {
    let iam = setup().await;
    register_default(&iam).await;
    let svc = iam.auth_service();

    let unknown = svc
        .login(login_request("nobody_here", PASSWORD))
        .await
        .unwrap_err();
    let wrong = svc
        .login(login_request(LOGIN, "Wrong#Pass123"))
        .await
        .unwrap_err();

    assert_eq!(unknown.code(), Code::Unauthenticated);
    assert_eq!(wrong.code(), Code::Unauthenticated);
    assert_eq!(unknown.message(), wrong.message());
    assert_eq!(error_code(&unknown), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn empty_credentials_are_invalid_argument() {
    let iam = setup().await;
    let svc = iam.auth_service();

    let err = svc.login(login_request("", PASSWORD)).await.unwrap_err();
    assert_eq!(error_code(&err), "EMPTY_LOGIN");

    let err = svc.login(login_request(LOGIN, "")).await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert_eq!(error_code(&err), "EMPTY_PASSWORD");
}

#[tokio::test]
async fn expired_session_is_reported() {
    let iam = setup().await;
    let user_uuid: Uuid = register_default(&iam).await.parse().unwrap();

    let now = unix_timestamp();
    let mut session = Session::new(user_uuid, now - 10, 0);
    session.expires_at = now - 1;
    iam.database().create_session(&session).await.unwrap();

    let err = iam
        .auth_service()
        .whoami(Request::new(WhoamiRequest {
            session_uuid: session.session_uuid.to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::Unauthenticated);
    assert_eq!(error_code(&err), "SESSION_EXPIRED");
}

#[tokio::test]
async fn malformed_session_uuid_is_invalid_argument() {
    let iam = setup().await;
    let err = iam
        .auth_service()
        .whoami(Request::new(WhoamiRequest {
            session_uuid: "not-a-uuid".into(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}
