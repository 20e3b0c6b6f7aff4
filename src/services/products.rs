use futures::try_join;
use uuid::Uuid;

use super::{validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{NewProduct, Product, ProductDetail, ProductFilter, ProductListing, ProductPatch};
use crate::database::store::ProductStore;
use crate::guard;
use crate::pagination::{PageRequest, PageResult};
use crate::types::{Action, ResourceKind};

fn validate_new(product: &NewProduct) -> ServiceResult<()> {
    validate::non_empty("name", &product.name)?;
    validate::non_empty("sku", &product.sku)?;
    validate::non_negative("price", product.price)?;
    validate::non_negative_opt("compare_at_price", product.compare_at_price)?;
    validate::non_negative_count("inventory", product.inventory)
}

fn validate_patch(patch: &ProductPatch) -> ServiceResult<()> {
    validate::non_empty_opt("name", patch.name.as_deref())?;
    validate::non_empty_opt("sku", patch.sku.as_deref())?;
    validate::non_negative_opt("price", patch.price)?;
    validate::non_negative_opt("compare_at_price", patch.compare_at_price)?;
    patch
        .inventory
        .map_or(Ok(()), |inventory| validate::non_negative_count("inventory", inventory))
}

pub async fn create_product<S: ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    product: NewProduct,
) -> ServiceResult<Product> {
    guard::check(caller, ResourceKind::Product, Action::Create, None)?;
    validate_new(&product)?;
    let product = store.create_product(product).await?;
    tracing::info!(product_id = %product.id, sku = %product.sku, "Created product");
    Ok(product)
}

/// Catalog listing with optional search and category filter.
pub async fn list_products<S: ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    filter: ProductFilter,
    page: PageRequest,
) -> ServiceResult<PageResult<ProductListing>> {
    guard::check(caller, ResourceKind::Product, Action::List, None)?;
    let window = page.window()?;
    let (products, total) = try_join!(store.list_products(&filter, window), store.count_products(&filter))?;
    Ok(page.wrap(products, total)?)
}

pub async fn get_product<S: ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<ProductDetail> {
    guard::check(caller, ResourceKind::Product, Action::Read, None)?;
    store
        .product_detail(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product not found"))
}

pub async fn update_product<S: ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    patch: ProductPatch,
) -> ServiceResult<Product> {
    guard::check(caller, ResourceKind::Product, Action::Update, None)?;
    validate_patch(&patch)?;
    Ok(store.update_product(id, patch).await?)
}

pub async fn delete_product<S: ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<()> {
    guard::check(caller, ResourceKind::Product, Action::Delete, None)?;
    store.delete_product(id).await?;
    tracing::info!(product_id = %id, "Deleted product");
    Ok(())
}
