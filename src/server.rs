//! Router assembly, store selection and the serve loop.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::JwtSessions;
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::handlers::{protected, public, AppState};
use crate::is_production;
use crate::middleware::session_middleware;
use crate::services::users;

/// Open the configured store backend. PostgreSQL is migrated first when
/// `database.run_migrations` is set.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            if is_production!() {
                anyhow::bail!("STORE_BACKEND=memory is not allowed in production");
            }
            tracing::warn!("Using the in-memory store; all data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Create the configured admin account if it does not exist yet.
pub async fn bootstrap_admin(store: &dyn Store, security: &SecurityConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&security.bootstrap_admin_email, &security.bootstrap_admin_password) else {
        return Ok(());
    };

    if let Some(admin) = users::ensure_admin(store, email, password)
        .await
        .context("failed to bootstrap admin account")?
    {
        tracing::info!(user_id = %admin.id, email = %admin.email, "Created bootstrap admin");
    }
    Ok(())
}

/// Bind, build and serve until ctrl-c.
pub async fn serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    bootstrap_admin(store.as_ref(), &config.security).await?;

    let sessions = JwtSessions::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .context("invalid JWT configuration")?;
    let state = AppState::new(store, sessions);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Storefront API listening on http://{} ({} store)",
        bind_addr,
        state.store.backend_name()
    );

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Resource API
        .merge(auth_routes())
        .merge(account_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(review_routes())
        .merge(setting_routes())
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Permissive unless explicit origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::session_whoami))
}

fn account_routes() -> Router<AppState> {
    use protected::profile;

    Router::new()
        .route("/api/user/profile", put(profile::profile_put))
        .route(
            "/api/user/addresses",
            get(profile::addresses_get).post(profile::addresses_post),
        )
        .route(
            "/api/user/addresses/:id",
            put(profile::address_put).delete(profile::address_delete),
        )
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::users_get).post(users::users_post))
        .route(
            "/api/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
}

fn catalog_routes() -> Router<AppState> {
    use protected::{categories, products};

    Router::new()
        .route("/api/products", get(products::products_get).post(products::products_post))
        .route(
            "/api/products/:id",
            get(products::product_get)
                .put(products::product_put)
                .delete(products::product_delete),
        )
        .route("/api/products/:id/reviews", get(products::product_reviews_get))
        .route(
            "/api/categories",
            get(categories::categories_get).post(categories::categories_post),
        )
        .route(
            "/api/categories/:id",
            get(categories::category_get)
                .put(categories::category_put)
                .delete(categories::category_delete),
        )
}

fn cart_routes() -> Router<AppState> {
    use protected::cart;

    Router::new()
        .route("/api/cart/:user_id", get(cart::cart_get).delete(cart::cart_delete))
        .route("/api/cart/:user_id/items", post(cart::cart_items_post))
        .route(
            "/api/cart/:user_id/items/:item_id",
            put(cart::cart_item_put).delete(cart::cart_item_delete),
        )
}

fn order_routes() -> Router<AppState> {
    use protected::orders;

    Router::new()
        .route("/api/orders", get(orders::orders_get).post(orders::orders_post))
        .route("/api/orders/:id", get(orders::order_get))
        .route("/api/orders/:id/status", put(orders::order_status_put))
        .route("/api/orders/:id/payment-status", put(orders::order_payment_status_put))
}

fn review_routes() -> Router<AppState> {
    use protected::reviews;

    Router::new()
        .route("/api/reviews", post(reviews::reviews_post))
        .route(
            "/api/reviews/:id",
            put(reviews::review_put).delete(reviews::review_delete),
        )
}

fn setting_routes() -> Router<AppState> {
    use protected::settings;

    Router::new()
        .route("/api/settings", get(settings::settings_get))
        .route(
            "/api/settings/:key",
            get(settings::setting_get)
                .put(settings::setting_put)
                .delete(settings::setting_delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Storefront API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/auth/register, /auth/login (public - token acquisition)",
            "session": "/api/auth/whoami",
            "account": "/api/user/profile, /api/user/addresses[/:id]",
            "users": "/api/users[/:id] (admin, or self)",
            "products": "/api/products[/:id][/reviews]",
            "categories": "/api/categories[/:id]",
            "cart": "/api/cart/:user_id[/items[/:item_id]]",
            "orders": "/api/orders[/:id][/status|/payment-status]",
            "reviews": "/api/reviews[/:id]",
            "settings": "/api/settings[/:key]",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": backend,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "error": "store unavailable",
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    use crate::config::config;

    fn test_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sessions = JwtSessions::new("router-test-secret", 1).unwrap();
        let state = AppState::new(store.clone(), sessions);
        (app(state, config()), store)
    }

    async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_the_backend() {
        let (app, _) = test_app();
        let (status, body) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn register_login_whoami() {
        let (app, _) = test_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "Shopper@Example.com", "password": "correct-horse", "name": "Shopper" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "shopper@example.com");
        assert_eq!(body["user"]["role"], "CUSTOMER");
        assert!(body["user"].get("password").is_none());

        let token = login(&app, "shopper@example.com", "correct-horse").await;
        let (status, body) = call(&app, Method::GET, "/api/auth/whoami", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Shopper");

        let (status, body) = call(&app, Method::GET, "/api/auth/whoami", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Not authenticated" }));
    }

    #[tokio::test]
    async fn guard_failures_render_as_json_errors() {
        let (app, store) = test_app();
        users::ensure_admin(store.as_ref(), "admin@example.com", "admin-password")
            .await
            .unwrap();
        call(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "c@example.com", "password": "customer-password" })),
        )
        .await;
        let customer = login(&app, "c@example.com", "customer-password").await;
        let admin = login(&app, "admin@example.com", "admin-password").await;

        let (status, body) = call(&app, Method::GET, "/api/users", Some(&customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Not authorized" }));

        let (status, body) = call(&app, Method::GET, "/api/users?limit=1", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["pagination"]["pages"], 2);
    }

    #[tokio::test]
    async fn malformed_bodies_and_bad_pages_are_bad_requests() {
        let (app, _) = test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = call(&app, Method::GET, "/api/products?page=0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn limits_are_clamped_to_the_configured_maximum() {
        let (app, _) = test_app();
        let max = config().pagination.max_limit;
        let uri = format!("/api/products?limit={}", max + 50);

        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["limit"], max);
        assert_eq!(body["products"], json!([]));
    }
}
