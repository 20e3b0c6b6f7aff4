//! Resource operations.
//!
//! Each operation takes the caller's identity explicitly, runs it through
//! the authorization guard, validates input and makes its store call(s).
//! Operations are generic over the store traits so they run unchanged
//! against PostgreSQL and the in-memory store.

pub mod addresses;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod users;
pub mod validate;

use crate::auth::password::PasswordError;
use crate::auth::{Identity, JwtError};
use crate::database::DatabaseError;
use crate::guard::AccessDenied;
use crate::pagination::PaginationError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not authorized")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Store(DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => ServiceError::Unauthenticated,
            AccessDenied::Forbidden => ServiceError::Forbidden,
        }
    }
}

impl From<PaginationError> for ServiceError {
    fn from(err: PaginationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Store(other),
        }
    }
}

/// The caller, or `Unauthenticated`. For operations that must reject
/// anonymous callers before looking anything up.
pub(crate) fn require_identity(caller: Option<&Identity>) -> ServiceResult<&Identity> {
    caller.ok_or(ServiceError::Unauthenticated)
}
