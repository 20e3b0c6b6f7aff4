//! Authorization guard.
//!
//! Every resource operation consults one decision table instead of carrying
//! its own role and ownership conditionals. [`authorize`] is a pure function
//! of its inputs and is safe to call with an anonymous caller.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::types::{Action, ResourceKind};

/// Access rule attached to a (resource, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone, including anonymous callers.
    PublicRead,
    /// Any authenticated caller; the operation scopes its own results.
    Authenticated,
    /// The owner of the target, or an admin.
    SelfOrAdmin,
    /// Admins only.
    AdminOnly,
    /// Only the user named in the payload, admins included.
    Creator,
    /// The user named in the payload, or an admin acting on their behalf.
    CreatorOrAdmin,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    Public,
    Authenticated,
    Owner,
    Admin,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Reason,
}

impl Decision {
    fn allow(reason: Reason) -> Self {
        Self { allowed: true, reason }
    }

    fn deny(reason: Reason) -> Self {
        Self { allowed: false, reason }
    }

    pub fn into_result(self) -> Result<(), AccessDenied> {
        match (self.allowed, self.reason) {
            (true, _) => Ok(()),
            (false, Reason::Unauthenticated) => Err(AccessDenied::Unauthenticated),
            (false, _) => Err(AccessDenied::Forbidden),
        }
    }
}

/// A denied decision, ready to propagate with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Not authorized")]
    Forbidden,
}

/// The decision table.
pub fn policy(kind: ResourceKind, action: Action) -> Policy {
    use Action::*;
    use ResourceKind::*;

    match (kind, action) {
        (Product | Category, Read | List) => Policy::PublicRead,
        (Product | Category, _) => Policy::AdminOnly,

        (User, Read | Update) => Policy::SelfOrAdmin,
        (User, _) => Policy::AdminOnly,

        (Cart, _) => Policy::SelfOrAdmin,
        (Address, _) => Policy::SelfOrAdmin,

        (Order, Create) => Policy::CreatorOrAdmin,
        (Order, List) => Policy::Authenticated,
        (Order, Read) => Policy::SelfOrAdmin,
        (Order, _) => Policy::AdminOnly,

        (Review, Read | List) => Policy::PublicRead,
        (Review, Create) => Policy::Creator,
        (Review, _) => Policy::SelfOrAdmin,

        (Setting, Read | List) => Policy::PublicRead,
        (Setting, _) => Policy::AdminOnly,
    }
}

/// Decide whether `identity` may perform `action` on a resource of `kind`.
///
/// `owner` is the user that owns the target (or, for creator policies, the
/// user named in the payload). `None` means globally owned.
pub fn authorize(
    identity: Option<&Identity>,
    kind: ResourceKind,
    action: Action,
    owner: Option<Uuid>,
) -> Decision {
    let policy = policy(kind, action);

    if policy == Policy::PublicRead {
        return Decision::allow(Reason::Public);
    }

    let Some(identity) = identity else {
        return Decision::deny(Reason::Unauthenticated);
    };

    let is_owner = owner.is_some_and(|owner| owner == identity.id);

    match policy {
        Policy::PublicRead => Decision::allow(Reason::Public),
        Policy::Authenticated => Decision::allow(Reason::Authenticated),
        Policy::AdminOnly if identity.is_admin() => Decision::allow(Reason::Admin),
        Policy::AdminOnly => Decision::deny(Reason::Forbidden),
        Policy::SelfOrAdmin | Policy::CreatorOrAdmin if is_owner => Decision::allow(Reason::Owner),
        Policy::SelfOrAdmin | Policy::CreatorOrAdmin if identity.is_admin() => Decision::allow(Reason::Admin),
        Policy::Creator if is_owner => Decision::allow(Reason::Owner),
        Policy::SelfOrAdmin | Policy::CreatorOrAdmin | Policy::Creator => Decision::deny(Reason::Forbidden),
    }
}

/// [`authorize`] and turn a denial into an error, logging either way.
pub fn check(
    identity: Option<&Identity>,
    kind: ResourceKind,
    action: Action,
    owner: Option<Uuid>,
) -> Result<(), AccessDenied> {
    let decision = authorize(identity, kind, action, owner);
    let caller = identity.map(|i| i.id);

    if decision.allowed {
        tracing::debug!(?caller, %kind, %action, reason = ?decision.reason, "access granted");
    } else {
        tracing::warn!(?caller, %kind, %action, reason = ?decision.reason, "access denied");
    }

    decision.into_result()
}
