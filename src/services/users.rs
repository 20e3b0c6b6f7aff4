use futures::try_join;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_identity, validate, ServiceError, ServiceResult};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Identity, JwtSessions};
use crate::database::models::{NewUser, Role, UserPatch, UserProfile};
use crate::database::store::UserStore;
use crate::guard;
use crate::pagination::{PageRequest, PageResult};
use crate::types::{Action, ResourceKind};

/// Self-service sign-up. Always creates a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Account created by an admin, with an explicit role.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    #[serde(default = "customer_role")]
    pub role: Role,
}

fn customer_role() -> Role {
    Role::Customer
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_in: u64,
    pub user: UserProfile,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn insert_account<S: UserStore + ?Sized>(
    store: &S,
    email: &str,
    password: &str,
    name: Option<String>,
    role: Role,
) -> ServiceResult<UserProfile> {
    let email = normalize_email(email);
    validate::email(&email)?;
    validate::password(password)?;
    validate::non_empty_opt("name", name.as_deref())?;

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::validation("User with this email already exists"));
    }

    let password_hash = hash_password(password.to_string()).await?;
    let user = store
        .create_user(NewUser {
            email,
            name,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "Created user");
    Ok(user)
}

pub async fn register<S: UserStore + ?Sized>(store: &S, input: Registration) -> ServiceResult<UserProfile> {
    insert_account(store, &input.email, &input.password, input.name, Role::Customer).await
}

/// Verify credentials and issue a session token.
pub async fn login<S: UserStore + ?Sized>(
    store: &S,
    sessions: &JwtSessions,
    email: &str,
    password: &str,
) -> ServiceResult<LoginResult> {
    let Some(user) = store.find_user_by_email(&normalize_email(email)).await? else {
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(ServiceError::InvalidCredentials);
    }

    let identity = Identity {
        id: user.id,
        role: user.role,
        email: user.email.clone(),
    };
    let token = sessions.issue(&identity)?;

    Ok(LoginResult {
        token,
        expires_in: sessions.expiry_hours() * 3600,
        user: UserProfile::from(&user),
    })
}

pub async fn create_user<S: UserStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    input: NewAccount,
) -> ServiceResult<UserProfile> {
    guard::check(caller, ResourceKind::User, Action::Create, None)?;
    insert_account(store, &input.email, &input.password, input.name, input.role).await
}

pub async fn list_users<S: UserStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    page: PageRequest,
) -> ServiceResult<PageResult<UserProfile>> {
    guard::check(caller, ResourceKind::User, Action::List, None)?;
    let window = page.window()?;
    let (users, total) = try_join!(store.list_users(window), store.count_users())?;
    Ok(page.wrap(users, total)?)
}

pub async fn get_user<S: UserStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<UserProfile> {
    guard::check(caller, ResourceKind::User, Action::Read, Some(id))?;
    store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

/// Owners may change their name and email; changing a role takes an admin.
pub async fn update_user<S: UserStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    mut patch: UserPatch,
) -> ServiceResult<UserProfile> {
    guard::check(caller, ResourceKind::User, Action::Update, Some(id))?;
    if patch.role.is_some() {
        guard::check(caller, ResourceKind::User, Action::ChangeRole, Some(id))?;
    }

    validate::non_empty_opt("name", patch.name.as_deref())?;
    if let Some(email) = patch.email.as_deref().map(normalize_email) {
        validate::email(&email)?;
        if let Some(existing) = store.find_user_by_email(&email).await? {
            if existing.id != id {
                return Err(ServiceError::validation("Email is already in use"));
            }
        }
        patch.email = Some(email);
    }

    Ok(store.update_user(id, patch).await?)
}

/// The caller's own name and email.
pub async fn update_profile<S: UserStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    patch: ProfilePatch,
) -> ServiceResult<UserProfile> {
    let identity = require_identity(caller)?;
    let patch = UserPatch {
        name: patch.name,
        email: patch.email,
        role: None,
    };
    update_user(store, caller, identity.id, patch).await
}

pub async fn delete_user<S: UserStore + ?Sized>(store: &S, caller: Option<&Identity>, id: Uuid) -> ServiceResult<()> {
    guard::check(caller, ResourceKind::User, Action::Delete, None)?;
    store.delete_user(id).await?;
    tracing::info!(user_id = %id, "Deleted user");
    Ok(())
}

/// Make sure an admin account exists for `email`. Returns the account when
/// one had to be created.
pub async fn ensure_admin<S: UserStore + ?Sized>(
    store: &S,
    email: &str,
    password: &str,
) -> ServiceResult<Option<UserProfile>> {
    if let Some(existing) = store.find_user_by_email(&normalize_email(email)).await? {
        if existing.role != Role::Admin {
            tracing::warn!(user_id = %existing.id, "Bootstrap admin email belongs to a non-admin account");
        }
        return Ok(None);
    }

    let admin = insert_account(store, email, password, Some("Administrator".to_string()), Role::Admin).await?;
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            name: Some("Shopper".to_string()),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_a_resolvable_token() {
        let ctx = TestContext::new().await.unwrap();
        let sessions = JwtSessions::new("test-secret", 2).unwrap();

        let user = register(&ctx.store, registration("New@Example.com")).await.unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.email, "new@example.com");

        let session = login(&ctx.store, &sessions, "new@example.com", "hunter2hunter2").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.expires_in, 7200);
        let claims = sessions.validate(&session.token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let ctx = TestContext::new().await.unwrap();
        let sessions = JwtSessions::new("test-secret", 1).unwrap();
        register(&ctx.store, registration("me@example.com")).await.unwrap();

        let wrong = login(&ctx.store, &sessions, "me@example.com", "not-my-password").await;
        let unknown = login(&ctx.store, &sessions, "nobody@example.com", "hunter2hunter2").await;
        assert!(matches!(wrong, Err(ServiceError::InvalidCredentials)));
        assert!(matches!(unknown, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let ctx = TestContext::new().await.unwrap();

        let bad_email = register(&ctx.store, registration("not-an-email")).await;
        assert!(matches!(bad_email, Err(ServiceError::Validation(_))));

        let mut short = registration("short@example.com");
        short.password = "short".to_string();
        assert!(matches!(register(&ctx.store, short).await, Err(ServiceError::Validation(_))));

        let duplicate = register(&ctx.store, registration("customer@example.com")).await;
        assert!(matches!(duplicate, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn customers_cannot_list_or_create_users() {
        let ctx = TestContext::new().await.unwrap();

        let listed = list_users(&ctx.store, Some(&ctx.customer), PageRequest::default()).await;
        assert!(matches!(listed, Err(ServiceError::Forbidden)));

        let anonymous = list_users(&ctx.store, None, PageRequest::default()).await;
        assert!(matches!(anonymous, Err(ServiceError::Unauthenticated)));

        let page = list_users(&ctx.store, Some(&ctx.admin), PageRequest::new(1, 1)).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.pages, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn self_or_admin_on_user_reads() {
        let ctx = TestContext::new().await.unwrap();
        let other = ctx.other_customer().await.unwrap();

        assert!(get_user(&ctx.store, Some(&ctx.customer), ctx.customer.id).await.is_ok());
        assert!(matches!(
            get_user(&ctx.store, Some(&ctx.customer), other.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(get_user(&ctx.store, Some(&ctx.admin), other.id).await.is_ok());
    }

    #[tokio::test]
    async fn customers_cannot_promote_themselves() {
        let ctx = TestContext::new().await.unwrap();
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };

        let escalated = update_user(&ctx.store, Some(&ctx.customer), ctx.customer.id, patch.clone()).await;
        assert!(matches!(escalated, Err(ServiceError::Forbidden)));

        let promoted = update_user(&ctx.store, Some(&ctx.admin), ctx.customer.id, patch).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn profile_update_rejects_taken_email() {
        let ctx = TestContext::new().await.unwrap();
        let patch = ProfilePatch {
            email: Some("admin@example.com".to_string()),
            ..Default::default()
        };

        let taken = update_profile(&ctx.store, Some(&ctx.customer), patch).await;
        assert!(matches!(taken, Err(ServiceError::Validation(_))));

        let renamed = update_profile(
            &ctx.store,
            Some(&ctx.customer),
            ProfilePatch {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let ctx = TestContext::new().await.unwrap();

        let created = ensure_admin(&ctx.store, "root@example.com", "rootpassword").await.unwrap();
        assert_eq!(created.map(|u| u.role), Some(Role::Admin));

        let again = ensure_admin(&ctx.store, "root@example.com", "rootpassword").await.unwrap();
        assert!(again.is_none());
    }
}
