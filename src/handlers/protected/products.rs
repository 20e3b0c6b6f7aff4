// handlers/protected/products.rs - Catalog: /api/products

use axum::extract::{Extension, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{NewProduct, Product, ProductDetail, ProductFilter, ProductListing, ProductPatch, ReviewWithAuthor};
use crate::handlers::{page_request, AppState, PageQuery};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Deleted, Keyed, Listing, Session};
use crate::services::{products, reviews};

/// `?page=&limit=&search=&category_id=`
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

/// GET /api/products - Public, paginated catalog
pub async fn products_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Listing<ProductListing>> {
    let page = page_request(query.page, query.limit);
    let filter = ProductFilter {
        search: query.search,
        category_id: query.category_id,
    };

    let products = products::list_products(state.store.as_ref(), session.identity(), filter, page).await?;
    Ok(ApiResponse::listing("products", products))
}

/// POST /api/products (admin)
pub async fn products_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(product): ApiJson<NewProduct>,
) -> ApiResult<Keyed<Product>> {
    let product = products::create_product(state.store.as_ref(), session.identity(), product).await?;
    Ok(ApiResponse::created("product", product))
}

/// GET /api/products/:id - Product with category, images and reviews
pub async fn product_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Keyed<ProductDetail>> {
    let product = products::get_product(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::keyed("product", product))
}

/// PUT /api/products/:id (admin)
pub async fn product_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Keyed<Product>> {
    let product = products::update_product(state.store.as_ref(), session.identity(), id, patch).await?;
    Ok(ApiResponse::keyed("product", product))
}

/// DELETE /api/products/:id (admin)
///
/// Products that appear on an order cannot be deleted.
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    products::delete_product(state.store.as_ref(), session.identity(), id).await?;
    Ok(ApiResponse::deleted())
}

/// GET /api/products/:id/reviews - Newest first, paginated
pub async fn product_reviews_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing<ReviewWithAuthor>> {
    let page = reviews::list_reviews(state.store.as_ref(), session.identity(), id, query.request()).await?;
    Ok(ApiResponse::listing("reviews", page))
}
