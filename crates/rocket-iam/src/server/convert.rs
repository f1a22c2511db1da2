//! Domain to wire conversions.

use rocket_core::convert::timestamp;
use rocket_proto::v1;

use crate::model::{NotificationMethod, Session, TokenPair, User};

pub fn user_to_proto(user: &User) -> v1::User {
    v1::User {
        user_uuid: user.user_uuid.to_string(),
        info: Some(v1::UserInfo {
            login: user.login.clone(),
            email: user.email.clone(),
            notification_methods: user
                .notification_methods
                .iter()
                .map(|m| v1::NotificationMethod {
                    provider_name: m.provider_name.clone(),
                    target: m.target.clone(),
                })
                .collect(),
        }),
        created_at: Some(timestamp(user.created_at)),
        updated_at: Some(timestamp(user.updated_at)),
    }
}

pub fn session_to_proto(session: &Session) -> v1::Session {
    v1::Session {
        session_uuid: session.session_uuid.to_string(),
        user_uuid: session.user_uuid.to_string(),
        created_at: Some(timestamp(session.created_at)),
        updated_at: Some(timestamp(session.updated_at)),
        expires_at: Some(timestamp(session.expires_at)),
    }
}

pub fn token_pair_to_proto(pair: TokenPair) -> v1::TokenPair {
    v1::TokenPair {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        access_expires_at: Some(timestamp(pair.access_expires_at)),
        refresh_expires_at: Some(timestamp(pair.refresh_expires_at)),
    }
}

pub fn notification_methods_from_proto(methods: Vec<v1::NotificationMethod>) -> Vec<NotificationMethod> {
    methods
        .into_iter()
        .map(|m| NotificationMethod {
            provider_name: m.provider_name,
            target: m.target,
        })
        .collect()
}
