//! Registration, lookup and credential checks.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use rocket_core::db::{DatabaseError, unix_timestamp};
use rocket_core::{ErrorCode, Result, ServiceError};

use crate::auth::HashParams;
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::model::{NewUser, User};
use crate::repository::UserRepository;
use crate::validation::{validate_email, validate_login, validate_password};

use super::{database_error, password_error};

/// Verified against for unknown logins so they cost as much as a wrong password.
const DUMMY_PASSWORD: &str = "rocket-factory-dummy-password";

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hash_params: HashParams,
    dummy_hash: OnceCell<String>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hash_params: HashParams) -> Self {
        Self {
            users,
            hash_params,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Validate, hash and persist a new user.
    pub async fn register(&self, new: NewUser) -> Result<User> {
        validate_login(&new.login)?;
        validate_email(&new.email)?;
        validate_password(&new.password)?;

        if self
            .users
            .get_user_by_login(&new.login)
            .await
            .map_err(database_error)?
            .is_some()
        {
            return Err(ErrorCode::UserAlreadyExists.into());
        }

        let password_hash = hash_password_blocking(new.password, self.hash_params)
            .await
            .map_err(password_error)?;

        let now = unix_timestamp();
        let user = User {
            user_uuid: Uuid::new_v4(),
            login: new.login,
            email: new.email,
            password_hash,
            notification_methods: new.notification_methods,
            created_at: now,
            updated_at: now,
        };

        match self.users.create_user(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same login.
            Err(DatabaseError::Conflict(_)) => return Err(ErrorCode::UserAlreadyExists.into()),
            Err(e) => return Err(database_error(e)),
        }

        info!(user_uuid = %user.user_uuid, login = %user.login, "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_uuid: Uuid) -> Result<User> {
        self.users
            .get_user(user_uuid)
            .await
            .map_err(database_error)?
            .ok_or_else(|| ErrorCode::UserNotFound.into())
    }

    /// Check a login/password pair.
    ///
    /// Unknown logins and wrong passwords fail identically with
    /// `INVALID_CREDENTIALS`.
    pub async fn verify_credentials(&self, login: &str, password: &str) -> Result<User> {
        if login.is_empty() {
            return Err(ErrorCode::EmptyLogin.into());
        }
        if password.is_empty() {
            return Err(ErrorCode::EmptyPassword.into());
        }

        let Some(user) = self
            .users
            .get_user_by_login(login)
            .await
            .map_err(database_error)?
        else {
            warn!(login = %login, "Login attempt for unknown user");
            let dummy = self.dummy_hash().await?;
            verify_password_blocking(password.to_string(), dummy)
                .await
                .map_err(password_error)?;
            return Err(invalid_credentials());
        };

        let valid = verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await
            .map_err(password_error)?;
        if !valid {
            warn!(user_uuid = %user.user_uuid, "Failed login attempt");
            return Err(invalid_credentials());
        }
        Ok(user)
    }

    /// Argon2 hash with the same cost as real users' hashes, computed once.
    async fn dummy_hash(&self) -> Result<String> {
        self.dummy_hash
            .get_or_try_init(|| async {
                hash_password_blocking(DUMMY_PASSWORD.to_string(), self.hash_params)
                    .await
                    .map_err(password_error)
            })
            .await
            .cloned()
    }
}

fn invalid_credentials() -> ServiceError {
    ErrorCode::InvalidCredentials.into()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::NotificationMethod;
    use crate::storage::IamDatabase;

    async fn service() -> UserService {
        let db = IamDatabase::open_in_memory().await.unwrap();
        UserService::new(Arc::new(db), HashParams::light())
    }

    fn astro(password: &str) -> NewUser {
        NewUser {
            login: "astro_01".into(),
            email: "a@b.co".into(),
            password: password.into(),
            notification_methods: vec![NotificationMethod {
                provider_name: "telegram".into(),
                target: "@astro".into(),
            }],
        }
    }

    #[tokio::test]
    async fn register_then_verify() {
        let svc = service().await;
        let user = svc.register(astro("StrongP@ss123!")).await.unwrap();
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert!(user.created_at <= user.updated_at);

        let fetched = svc.get_user(user.user_uuid).await.unwrap();
        assert_eq!(fetched.notification_methods.len(), 1);

        let verified = svc
            .verify_credentials("astro_01", "StrongP@ss123!")
            .await
            .unwrap();
        assert_eq!(verified.user_uuid, user.user_uuid);
    }

    #[tokio::test]
    async fn weak_password_creates_nothing() {
        let svc = service().await;
        let err = svc.register(astro("weak")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::WeakPassword);

        let err = svc
            .verify_credentials("astro_01", "weak")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected() {
        let svc = service().await;
        svc.register(astro("StrongP@ss123!")).await.unwrap();
        let err = svc.register(astro("OtherP@ss456!")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserAlreadyExists);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let svc = service().await;
        svc.register(astro("StrongP@ss123!")).await.unwrap();

        let wrong = svc
            .verify_credentials("astro_01", "WrongP@ss123!")
            .await
            .unwrap_err();
        let unknown = svc
            .verify_credentials("nobody", "StrongP@ss123!")
            .await
            .unwrap_err();
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_hash() {
        let svc = service().await;
        assert!(svc.dummy_hash.get().is_none());

        let err = svc
            .verify_credentials("nobody", DUMMY_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        let dummy = svc.dummy_hash.get().unwrap().clone();
        assert!(dummy.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

        svc.verify_credentials("nobody", "x").await.unwrap_err();
        assert_eq!(svc.dummy_hash.get(), Some(&dummy));
    }

    #[tokio::test]
    async fn empty_credentials_have_dedicated_codes() {
        let svc = service().await;
        assert_eq!(
            svc.verify_credentials("", "x").await.unwrap_err().code,
            ErrorCode::EmptyLogin
        );
        assert_eq!(
            svc.verify_credentials("astro_01", "").await.unwrap_err().code,
            ErrorCode::EmptyPassword
        );
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let svc = service().await;
        let err = svc.get_user(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
