//! End-to-end IAM flows over a real gRPC connection.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use rocket_core::{ErrorCode, ServiceError};
use rocket_proto::v1::auth_service_client::AuthServiceClient;
use rocket_proto::v1::auth_service_server::AuthServiceServer;
use rocket_proto::v1::jwt_service_server::JwtServiceServer;
use rocket_proto::v1::user_service_client::UserServiceClient;
use rocket_proto::v1::user_service_server::UserServiceServer;
use rocket_proto::v1::{LoginRequest, RegisterRequest, UserInfo, WhoamiRequest};

use rocket_iam::app::{Iam, IamSettings};
use rocket_iam::auth::HashParams;
use rocket_iam::storage::IamDatabase;

async fn spawn_server() -> SocketAddr {
    let db = IamDatabase::open_in_memory().await.unwrap();
    let iam = Iam::build(
        db,
        &IamSettings {
            session_ttl: Duration::from_secs(3600),
            cache_max_capacity: 100,
            access_secret: b"a".to_vec(),
            refresh_secret: b"r".to_vec(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(600),
            hash_params: HashParams::light(),
        },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Server::builder()
        .add_service(AuthServiceServer::new(iam.auth_service()))
        .add_service(UserServiceServer::new(iam.user_service()))
        .add_service(JwtServiceServer::new(iam.jwt_service()));
    tokio::spawn(router.serve_with_incoming(TcpListenerStream::new(listener)));
    addr
}

#[tokio::test]
async fn register_login_whoami_over_the_wire() {
    let addr = spawn_server().await;
    let endpoint = format!("http://{addr}");
    let mut users = UserServiceClient::connect(endpoint.clone()).await.unwrap();
    let mut auth = AuthServiceClient::connect(endpoint).await.unwrap();

    let user_uuid = users
        .register(RegisterRequest {
            info: Some(UserInfo {
                login: "astro_01".into(),
                email: "a@b.co".into(),
                notification_methods: vec![],
            }),
            password: "StrongP@ss123!".into(),
        })
        .await
        .unwrap()
        .into_inner()
        .user_uuid;

    let session_uuid = auth
        .login(LoginRequest {
            login: "astro_01".into(),
            password: "StrongP@ss123!".into(),
        })
        .await
        .unwrap()
        .into_inner()
        .session_uuid;

    let who = auth
        .whoami(WhoamiRequest { session_uuid })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(who.user.unwrap().user_uuid, user_uuid);
}

#[tokio::test]
async fn error_code_survives_the_transport() {
    let addr = spawn_server().await;
    let mut auth = AuthServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap();

    let status = auth
        .whoami(WhoamiRequest {
            session_uuid: uuid::Uuid::new_v4().to_string(),
        })
        .await
        .unwrap_err();
    let err = ServiceError::from_status(&status);
    assert_eq!(err.code, ErrorCode::SessionNotFound);
}
