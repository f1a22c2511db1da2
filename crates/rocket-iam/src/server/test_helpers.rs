//! Shared setup for the IAM gRPC service tests.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tonic::Request;

use rocket_proto::v1::user_service_server::UserService as _;
use rocket_proto::v1::{NotificationMethod, RegisterRequest, UserInfo};

use crate::app::{Iam, IamSettings};
use crate::auth::HashParams;
use crate::storage::IamDatabase;

pub const LOGIN: &str = "astro_01";
pub const PASSWORD: &str = "StrongP@ss123!";

pub fn test_settings() -> IamSettings {
    IamSettings {
        session_ttl: Duration::from_secs(3600),
        cache_max_capacity: 1_000,
        access_secret: b"test-access-secret".to_vec(),
        refresh_secret: b"test-refresh-secret".to_vec(),
        access_ttl: Duration::from_secs(900),
        refresh_ttl: Duration::from_secs(86_400),
        hash_params: HashParams::light(),
    }
}

pub async fn setup() -> Iam {
    let db = IamDatabase::open_in_memory().await.unwrap();
    Iam::build(db, &test_settings())
}

pub fn register_request(login: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        info: Some(UserInfo {
            login: login.into(),
            email: "a@b.co".into(),
            notification_methods: vec![NotificationMethod {
                provider_name: "telegram".into(),
                target: "@astro".into(),
            }],
        }),
        password: password.into(),
    }
}

/// Register the default user and return its uuid string.
pub async fn register_default(iam: &Iam) -> String {
    iam.user_service()
        .register(Request::new(register_request(LOGIN, PASSWORD)))
        .await
        .unwrap()
        .into_inner()
        .user_uuid
}

/// Read the `x-error-code` metadata from a status.
pub fn error_code(status: &tonic::Status) -> String {
    status
        .metadata()
        .get(rocket_core::error::ERROR_CODE_METADATA_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
