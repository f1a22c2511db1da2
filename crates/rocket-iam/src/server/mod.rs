//! gRPC server implementations for the IAM service.

pub mod auth_svc;
pub mod convert;
pub mod jwt_svc;
pub mod user_svc;

#[cfg(test)]
mod auth_svc_tests;
#[cfg(test)]
mod test_helpers;

pub use auth_svc::AuthServiceImpl;
pub use jwt_svc::JwtServiceImpl;
pub use user_svc::UserServiceImpl;
