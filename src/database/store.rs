//! The relational store boundary.
//!
//! One trait per resource; [`Store`] bundles them. Every method is a single
//! logical round trip. Writes that must stay atomic (cart upsert, category
//! deletion, order creation, status compare-and-set) are atomic inside the
//! implementation, not composed by callers.

use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;
use crate::pagination::PageWindow;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserProfile>>;
    /// Includes the password hash; for credential checks only.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, window: PageWindow) -> StoreResult<Vec<UserProfile>>;
    async fn count_users(&self) -> StoreResult<i64>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<UserProfile>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;
    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
    async fn product_detail(&self, id: Uuid) -> StoreResult<Option<ProductDetail>>;
    async fn list_products(&self, filter: &ProductFilter, window: PageWindow) -> StoreResult<Vec<ProductListing>>;
    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<i64>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> StoreResult<Product>;
    async fn delete_product(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category>;
    /// Top-level categories only, unless `include_subcategories`, in which
    /// case every category is returned with its direct children.
    async fn list_categories(&self, include_subcategories: bool) -> StoreResult<Vec<CategoryListing>>;
    async fn category_detail(&self, id: Uuid) -> StoreResult<Option<CategoryDetail>>;
    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> StoreResult<Category>;
    /// Clears `category_id` on dependent products and detaches child
    /// categories, then deletes, all in one transaction.
    async fn delete_category(&self, id: Uuid) -> StoreResult<Category>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Create the user's cart if needed, then add `quantity` to the line for
    /// `product_id`, creating it if absent. Atomic.
    async fn add_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem>;
    async fn cart_for_user(&self, user_id: Uuid) -> StoreResult<Option<CartView>>;
    /// `None` when the item is not in this user's cart.
    async fn set_cart_item_quantity(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>>;
    async fn remove_cart_item(&self, user_id: Uuid, item_id: Uuid) -> StoreResult<Option<CartItem>>;
    /// Returns the number of lines removed.
    async fn clear_cart(&self, user_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> StoreResult<OrderWithItems>;
    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn order_detail(&self, id: Uuid) -> StoreResult<Option<OrderDetail>>;
    /// Newest first. `user_id` restricts to one customer.
    async fn list_orders(&self, user_id: Option<Uuid>, window: PageWindow) -> StoreResult<Vec<OrderDetail>>;
    async fn count_orders(&self, user_id: Option<Uuid>) -> StoreResult<i64>;
    /// Compare-and-set; `None` if the order is gone or no longer in `from`.
    async fn transition_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<Option<Order>>;
    async fn transition_payment_status(&self, id: Uuid, from: PaymentStatus, to: PaymentStatus) -> StoreResult<Option<Order>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(&self, review: NewReview) -> StoreResult<Review>;
    async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>>;
    /// Newest first.
    async fn list_reviews(&self, product_id: Uuid, window: PageWindow) -> StoreResult<Vec<ReviewWithAuthor>>;
    async fn count_reviews(&self, product_id: Uuid) -> StoreResult<i64>;
    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> StoreResult<Review>;
    async fn delete_review(&self, id: Uuid) -> StoreResult<Review>;
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>>;
    async fn create_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address>;
    async fn find_address(&self, id: Uuid) -> StoreResult<Option<Address>>;
    async fn update_address(&self, id: Uuid, patch: AddressPatch) -> StoreResult<Address>;
    async fn delete_address(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait SettingStore: Send + Sync {
    /// Insert, or replace value and type of the existing key.
    async fn upsert_setting(&self, key: &str, value: &str, setting_type: SettingType) -> StoreResult<Setting>;
    async fn find_setting(&self, key: &str) -> StoreResult<Option<Setting>>;
    async fn list_settings(&self, setting_type: Option<SettingType>) -> StoreResult<Vec<Setting>>;
    /// `false` when the key did not exist.
    async fn delete_setting(&self, key: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait Store:
    UserStore + ProductStore + CategoryStore + CartStore + OrderStore + ReviewStore + AddressStore + SettingStore
{
    /// Liveness probe for `/health`.
    async fn ping(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}
