//! Credential primitives for the IAM service.
//!
//! Provides password hashing, JWT issuance/validation and the token
//! revocation blacklist.

pub mod blacklist;
pub mod claims;
pub mod jwt;
pub mod password;

pub use blacklist::TokenBlacklist;
pub use claims::{Claims, TokenType};
pub use jwt::{IssuedToken, JwtManager, TokenError};
pub use password::{HashParams, PasswordError};
