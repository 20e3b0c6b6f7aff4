//! In-memory implementation of the store traits.
//!
//! Backs development runs and the test suite. All tables sit behind one
//! `RwLock`, so every trait method is atomic. Foreign keys, uniqueness and
//! cascades follow the PostgreSQL schema in `migrations/`.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::category::with_children;
use super::models::*;
use super::store::*;
use crate::pagination::PageWindow;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    product_images: Vec<ProductImage>,
    carts: Vec<Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    reviews: Vec<Review>,
    addresses: Vec<Address>,
    settings: Vec<Setting>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an image to a product. Images have no write API; this is for
    /// seeding.
    pub async fn add_product_image(&self, product_id: Uuid, url: &str, alt: Option<&str>) -> StoreResult<ProductImage> {
        let mut t = self.tables.write().await;
        t.require_product(product_id)?;
        let position = t.product_images.iter().filter(|i| i.product_id == product_id).count() as i32;
        let image = ProductImage {
            id: Uuid::new_v4(),
            product_id,
            url: url.to_string(),
            alt: alt.map(str::to_string),
            position,
        };
        t.product_images.push(image.clone());
        Ok(image)
    }
}

fn constraint(message: &str) -> DatabaseError {
    DatabaseError::Constraint(message.to_string())
}

fn page<T>(rows: impl Iterator<Item = T>, window: PageWindow) -> Vec<T> {
    rows.skip(window.skip as usize).take(window.take as usize).collect()
}

impl Tables {
    fn require_user(&self, id: Uuid) -> StoreResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| constraint("referenced record missing or still in use (user_id)"))
    }

    fn require_product(&self, id: Uuid) -> StoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| constraint("referenced record missing or still in use (product_id)"))
    }

    fn require_category(&self, id: Option<Uuid>) -> StoreResult<()> {
        match id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => {
                Err(constraint("referenced record missing or still in use (category_id)"))
            }
            _ => Ok(()),
        }
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users.iter().any(|u| u.email == email && Some(u.id) != except)
    }

    fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> bool {
        self.products.iter().any(|p| p.sku == sku && Some(p.id) != except)
    }

    fn category(&self, id: Option<Uuid>) -> Option<Category> {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id).cloned())
    }

    fn images_of(&self, product_id: Uuid) -> Vec<ProductImage> {
        let mut images: Vec<ProductImage> = self
            .product_images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        images
    }

    fn listing(&self, product: &Product) -> ProductListing {
        ProductListing {
            category: self.category(product.category_id),
            images: self.images_of(product.id),
            product: product.clone(),
        }
    }

    /// Newest first.
    fn reviews_of(&self, product_id: Uuid) -> impl Iterator<Item = ReviewWithAuthor> + '_ {
        self.reviews
            .iter()
            .rev()
            .filter(move |r| r.product_id == product_id)
            .map(|review| ReviewWithAuthor {
                user: ReviewAuthor {
                    id: review.user_id,
                    name: self.users.iter().find(|u| u.id == review.user_id).and_then(|u| u.name.clone()),
                },
                review: review.clone(),
            })
    }

    fn order_detail(&self, order: &Order) -> OrderDetail {
        let order_items = self
            .order_items
            .iter()
            .filter(|i| i.order_id == order.id)
            .map(|item| OrderLine {
                product: self.products.iter().find(|p| p.id == item.product_id).cloned(),
                item: item.clone(),
            })
            .collect();

        OrderDetail {
            order_items,
            shipping_address: self.addresses.iter().find(|a| a.id == order.shipping_address_id).cloned(),
            user: None,
            order: order.clone(),
        }
    }

    /// Newest first, optionally restricted to one customer.
    fn orders_for(&self, user_id: Option<Uuid>) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .rev()
            .filter(move |o| user_id.map_or(true, |id| o.user_id == id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserProfile> {
        let mut t = self.tables.write().await;
        if t.email_taken(&user.email, None) {
            return Err(constraint("duplicate value violates users_email_key"));
        }
        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        let profile = UserProfile::from(&row);
        t.users.push(row);
        Ok(profile)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserProfile>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).map(UserProfile::from))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, window: PageWindow) -> StoreResult<Vec<UserProfile>> {
        let t = self.tables.read().await;
        Ok(page(t.users.iter().map(UserProfile::from), window))
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<UserProfile> {
        let mut t = self.tables.write().await;
        if let Some(email) = &patch.email {
            if t.email_taken(email, Some(id)) {
                return Err(constraint("duplicate value violates users_email_key"));
            }
        }
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::not_found("User not found"))?;

        if let Some(name) = patch.name {
            user.name = Some(name);
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(UserProfile::from(&*user))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == id) {
            return Err(DatabaseError::not_found("User not found"));
        }
        if t.orders.iter().any(|o| o.user_id == id) {
            return Err(constraint("referenced record missing or still in use (orders_user_id_fkey)"));
        }

        let cart_ids: Vec<Uuid> = t.carts.iter().filter(|c| c.user_id == id).map(|c| c.id).collect();
        t.cart_items.retain(|i| !cart_ids.contains(&i.cart_id));
        t.carts.retain(|c| c.user_id != id);
        t.addresses.retain(|a| a.user_id != id);
        t.reviews.retain(|r| r.user_id != id);
        t.users.retain(|u| u.id != id);
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut t = self.tables.write().await;
        if t.sku_taken(&product.sku, None) {
            return Err(constraint("duplicate value violates products_sku_key"));
        }
        t.require_category(product.category_id)?;

        let now = Utc::now();
        let row = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            compare_at_price: product.compare_at_price,
            sku: product.sku,
            barcode: product.barcode,
            inventory: product.inventory,
            weight: product.weight,
            length: product.length,
            width: product.width,
            height: product.height,
            is_digital: product.is_digital,
            digital_file_url: product.digital_file_url,
            category_id: product.category_id,
            created_at: now,
            updated_at: now,
        };
        t.products.push(row.clone());
        Ok(row)
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let t = self.tables.read().await;
        Ok(t.products.iter().find(|p| p.id == id).cloned())
    }

    async fn product_detail(&self, id: Uuid) -> StoreResult<Option<ProductDetail>> {
        let t = self.tables.read().await;
        let Some(product) = t.products.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        let listing = t.listing(product);
        Ok(Some(ProductDetail {
            product: listing.product,
            category: listing.category,
            images: listing.images,
            reviews: t.reviews_of(id).collect(),
        }))
    }

    async fn list_products(&self, filter: &ProductFilter, window: PageWindow) -> StoreResult<Vec<ProductListing>> {
        let t = self.tables.read().await;
        let matching = t.products.iter().filter(|p| filter.matches(p)).map(|p| t.listing(p));
        Ok(page(matching, window))
    }

    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.products.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let mut t = self.tables.write().await;
        if let Some(sku) = &patch.sku {
            if t.sku_taken(sku, Some(id)) {
                return Err(constraint("duplicate value violates products_sku_key"));
            }
        }
        t.require_category(patch.category_id.flatten())?;

        let product = t
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DatabaseError::not_found("Product not found"))?;

        if let Some(v) = patch.name {
            product.name = v;
        }
        if let Some(v) = patch.description {
            product.description = v;
        }
        if let Some(v) = patch.price {
            product.price = v;
        }
        if let Some(v) = patch.compare_at_price {
            product.compare_at_price = Some(v);
        }
        if let Some(v) = patch.sku {
            product.sku = v;
        }
        if let Some(v) = patch.barcode {
            product.barcode = Some(v);
        }
        if let Some(v) = patch.inventory {
            product.inventory = v;
        }
        if let Some(v) = patch.weight {
            product.weight = Some(v);
        }
        if let Some(v) = patch.length {
            product.length = Some(v);
        }
        if let Some(v) = patch.width {
            product.width = Some(v);
        }
        if let Some(v) = patch.height {
            product.height = Some(v);
        }
        if let Some(v) = patch.is_digital {
            product.is_digital = v;
        }
        if let Some(v) = patch.digital_file_url {
            product.digital_file_url = Some(v);
        }
        if let Some(v) = patch.category_id {
            product.category_id = v;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.products.iter().any(|p| p.id == id) {
            return Err(DatabaseError::not_found("Product not found"));
        }
        if t.order_items.iter().any(|i| i.product_id == id) {
            return Err(constraint("referenced record missing or still in use (order_items_product_id_fkey)"));
        }

        t.product_images.retain(|i| i.product_id != id);
        t.cart_items.retain(|i| i.product_id != id);
        t.reviews.retain(|r| r.product_id != id);
        t.products.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        t.require_category(category.parent_category_id)?;

        let now = Utc::now();
        let row = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            parent_category_id: category.parent_category_id,
            created_at: now,
            updated_at: now,
        };
        t.categories.push(row.clone());
        Ok(row)
    }

    async fn list_categories(&self, include_subcategories: bool) -> StoreResult<Vec<CategoryListing>> {
        let t = self.tables.read().await;
        let mut all = t.categories.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        if include_subcategories {
            return Ok(with_children(all));
        }
        Ok(all
            .into_iter()
            .filter(|c| c.parent_category_id.is_none())
            .map(|category| CategoryListing {
                category,
                sub_categories: None,
            })
            .collect())
    }

    async fn category_detail(&self, id: Uuid) -> StoreResult<Option<CategoryDetail>> {
        let t = self.tables.read().await;
        let Some(category) = t.category(Some(id)) else {
            return Ok(None);
        };

        let mut sub_categories: Vec<Category> = t
            .categories
            .iter()
            .filter(|c| c.parent_category_id == Some(id))
            .cloned()
            .collect();
        sub_categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(Some(CategoryDetail {
            parent_category: t.category(category.parent_category_id),
            category,
            sub_categories,
        }))
    }

    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        if let Some(parent) = patch.parent_category_id {
            t.require_category(parent)?;
        }
        let category = t
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::not_found("Category not found"))?;

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(description) = patch.description {
            category.description = Some(description);
        }
        if let Some(parent) = patch.parent_category_id {
            category.parent_category_id = parent;
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        let index = t
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DatabaseError::not_found("Category not found"))?;

        let now = Utc::now();
        for product in t.products.iter_mut().filter(|p| p.category_id == Some(id)) {
            product.category_id = None;
            product.updated_at = now;
        }
        for child in t.categories.iter_mut().filter(|c| c.parent_category_id == Some(id)) {
            child.parent_category_id = None;
            child.updated_at = now;
        }
        Ok(t.categories.remove(index))
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn add_cart_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> StoreResult<CartItem> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        t.require_product(product_id)?;
        if quantity <= 0 {
            return Err(constraint("value rejected by cart_items_quantity_check"));
        }
        let current = t
            .carts
            .iter()
            .find(|c| c.user_id == user_id)
            .and_then(|cart| {
                t.cart_items
                    .iter()
                    .find(|i| i.cart_id == cart.id && i.product_id == product_id)
            })
            .map(|item| item.quantity);
        if current.is_some_and(|current| current.checked_add(quantity).is_none()) {
            return Err(constraint("integer out of range for cart_items.quantity"));
        }

        let now = Utc::now();
        let cart_id = match t.carts.iter_mut().find(|c| c.user_id == user_id) {
            Some(cart) => {
                cart.updated_at = now;
                cart.id
            }
            None => {
                let cart = Cart {
                    id: Uuid::new_v4(),
                    user_id,
                    created_at: now,
                    updated_at: now,
                };
                let id = cart.id;
                t.carts.push(cart);
                id
            }
        };

        if let Some(item) = t
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            item.quantity += quantity;
            item.updated_at = now;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: Uuid::new_v4(),
            cart_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        t.cart_items.push(item.clone());
        Ok(item)
    }

    async fn cart_for_user(&self, user_id: Uuid) -> StoreResult<Option<CartView>> {
        let t = self.tables.read().await;
        let Some(cart) = t.carts.iter().find(|c| c.user_id == user_id) else {
            return Ok(None);
        };

        let items = t
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart.id)
            .filter_map(|item| {
                let product = t.products.iter().find(|p| p.id == item.product_id)?.clone();
                Some(CartLine {
                    item: item.clone(),
                    product,
                })
            })
            .collect();

        Ok(Some(CartView {
            cart: cart.clone(),
            items,
        }))
    }

    async fn set_cart_item_quantity(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> StoreResult<Option<CartItem>> {
        let mut t = self.tables.write().await;
        if quantity <= 0 {
            return Err(constraint("value rejected by cart_items_quantity_check"));
        }
        let Some(cart_id) = t.carts.iter().find(|c| c.user_id == user_id).map(|c| c.id) else {
            return Ok(None);
        };

        Ok(t
            .cart_items
            .iter_mut()
            .find(|i| i.id == item_id && i.cart_id == cart_id)
            .map(|item| {
                item.quantity = quantity;
                item.updated_at = Utc::now();
                item.clone()
            }))
    }

    async fn remove_cart_item(&self, user_id: Uuid, item_id: Uuid) -> StoreResult<Option<CartItem>> {
        let mut t = self.tables.write().await;
        let Some(cart_id) = t.carts.iter().find(|c| c.user_id == user_id).map(|c| c.id) else {
            return Ok(None);
        };

        let index = t.cart_items.iter().position(|i| i.id == item_id && i.cart_id == cart_id);
        Ok(index.map(|index| t.cart_items.remove(index)))
    }

    async fn clear_cart(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut t = self.tables.write().await;
        let Some(cart_id) = t.carts.iter().find(|c| c.user_id == user_id).map(|c| c.id) else {
            return Ok(0);
        };

        let before = t.cart_items.len();
        t.cart_items.retain(|i| i.cart_id != cart_id);
        Ok((before - t.cart_items.len()) as u64)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<OrderWithItems> {
        let mut t = self.tables.write().await;
        t.require_user(order.user_id)?;
        if !t.addresses.iter().any(|a| a.id == order.shipping_address_id) {
            return Err(constraint("referenced record missing or still in use (shipping_address_id)"));
        }
        for item in &order.order_items {
            t.require_product(item.product_id)?;
        }

        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: order.payment_method,
            total: order.total,
            sub_total: order.sub_total,
            tax: order.tax,
            shipping_cost: order.shipping_cost,
            shipping_address_id: order.shipping_address_id,
            created_at: now,
            updated_at: now,
        };
        let order_items: Vec<OrderItem> = order
            .order_items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                order_id: created.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        t.orders.push(created.clone());
        t.order_items.extend(order_items.iter().cloned());
        Ok(OrderWithItems {
            order: created,
            order_items,
        })
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let t = self.tables.read().await;
        Ok(t.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_detail(&self, id: Uuid) -> StoreResult<Option<OrderDetail>> {
        let t = self.tables.read().await;
        let Some(order) = t.orders.iter().find(|o| o.id == id) else {
            return Ok(None);
        };

        let mut detail = t.order_detail(order);
        detail.user = t.users.iter().find(|u| u.id == order.user_id).map(|u| OrderCustomer {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        });
        Ok(Some(detail))
    }

    async fn list_orders(&self, user_id: Option<Uuid>, window: PageWindow) -> StoreResult<Vec<OrderDetail>> {
        let t = self.tables.read().await;
        Ok(page(t.orders_for(user_id).map(|o| t.order_detail(o)), window))
    }

    async fn count_orders(&self, user_id: Option<Uuid>) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.orders_for(user_id).count() as i64)
    }

    async fn transition_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<Option<Order>> {
        let mut t = self.tables.write().await;
        Ok(t
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == from)
            .map(|order| {
                order.status = to;
                order.updated_at = Utc::now();
                order.clone()
            }))
    }

    async fn transition_payment_status(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> StoreResult<Option<Order>> {
        let mut t = self.tables.write().await;
        Ok(t
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.payment_status == from)
            .map(|order| {
                order.payment_status = to;
                order.updated_at = Utc::now();
                order.clone()
            }))
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create_review(&self, review: NewReview) -> StoreResult<Review> {
        let mut t = self.tables.write().await;
        t.require_user(review.user_id)?;
        t.require_product(review.product_id)?;
        if !(1..=5).contains(&review.rating) {
            return Err(constraint("value rejected by reviews_rating_check"));
        }

        let now = Utc::now();
        let row = Review {
            id: Uuid::new_v4(),
            user_id: review.user_id,
            product_id: review.product_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        t.reviews.push(row.clone());
        Ok(row)
    }

    async fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        let t = self.tables.read().await;
        Ok(t.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reviews(&self, product_id: Uuid, window: PageWindow) -> StoreResult<Vec<ReviewWithAuthor>> {
        let t = self.tables.read().await;
        Ok(page(t.reviews_of(product_id), window))
    }

    async fn count_reviews(&self, product_id: Uuid) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.reviews.iter().filter(|r| r.product_id == product_id).count() as i64)
    }

    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> StoreResult<Review> {
        let mut t = self.tables.write().await;
        if let Some(rating) = patch.rating {
            if !(1..=5).contains(&rating) {
                return Err(constraint("value rejected by reviews_rating_check"));
            }
        }
        let review = t
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DatabaseError::not_found("Review not found"))?;

        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        if let Some(comment) = patch.comment {
            review.comment = Some(comment);
        }
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<Review> {
        let mut t = self.tables.write().await;
        let index = t
            .reviews
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DatabaseError::not_found("Review not found"))?;
        Ok(t.reviews.remove(index))
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
        let t = self.tables.read().await;
        Ok(t.addresses.iter().filter(|a| a.user_id == user_id).cloned().collect())
    }

    async fn create_address(&self, user_id: Uuid, address: NewAddress) -> StoreResult<Address> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;

        let now = Utc::now();
        let row = Address {
            id: Uuid::new_v4(),
            user_id,
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            is_default: address.is_default,
            created_at: now,
            updated_at: now,
        };
        t.addresses.push(row.clone());
        Ok(row)
    }

    async fn find_address(&self, id: Uuid) -> StoreResult<Option<Address>> {
        let t = self.tables.read().await;
        Ok(t.addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn update_address(&self, id: Uuid, patch: AddressPatch) -> StoreResult<Address> {
        let mut t = self.tables.write().await;
        let address = t
            .addresses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DatabaseError::not_found("Address not found"))?;

        if let Some(v) = patch.street {
            address.street = v;
        }
        if let Some(v) = patch.city {
            address.city = v;
        }
        if let Some(v) = patch.state {
            address.state = Some(v);
        }
        if let Some(v) = patch.postal_code {
            address.postal_code = v;
        }
        if let Some(v) = patch.country {
            address.country = v;
        }
        if let Some(v) = patch.is_default {
            address.is_default = v;
        }
        address.updated_at = Utc::now();
        Ok(address.clone())
    }

    async fn delete_address(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.addresses.iter().any(|a| a.id == id) {
            return Err(DatabaseError::not_found("Address not found"));
        }
        if t.orders.iter().any(|o| o.shipping_address_id == id) {
            return Err(constraint("referenced record missing or still in use (orders_shipping_address_id_fkey)"));
        }
        t.addresses.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn upsert_setting(&self, key: &str, value: &str, setting_type: SettingType) -> StoreResult<Setting> {
        let mut t = self.tables.write().await;
        let now = Utc::now();

        if let Some(setting) = t.settings.iter_mut().find(|s| s.key == key) {
            setting.value = value.to_string();
            setting.setting_type = setting_type;
            setting.updated_at = now;
            return Ok(setting.clone());
        }

        let setting = Setting {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value: value.to_string(),
            setting_type,
            created_at: now,
            updated_at: now,
        };
        t.settings.push(setting.clone());
        Ok(setting)
    }

    async fn find_setting(&self, key: &str) -> StoreResult<Option<Setting>> {
        let t = self.tables.read().await;
        Ok(t.settings.iter().find(|s| s.key == key).cloned())
    }

    async fn list_settings(&self, setting_type: Option<SettingType>) -> StoreResult<Vec<Setting>> {
        let t = self.tables.read().await;
        let mut settings: Vec<Setting> = t
            .settings
            .iter()
            .filter(|s| setting_type.map_or(true, |ty| s.setting_type == ty))
            .cloned()
            .collect();
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    async fn delete_setting(&self, key: &str) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.settings.len();
        t.settings.retain(|s| s.key != key);
        Ok(t.settings.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
