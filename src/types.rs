/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Entity types an operation can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    User,
    Product,
    Category,
    Cart,
    Order,
    Review,
    Address,
    Setting,
}

/// Operations the authorization guard distinguishes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Read,
    List,
    Create,
    Update,
    Delete,
    ChangeRole,
    UpdateStatus,
    UpdatePaymentStatus,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
