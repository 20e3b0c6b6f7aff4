use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::models::*;
use crate::database::store::*;
use crate::database::MemoryStore;

/// Fixtures for service tests: a fresh in-memory store with one admin and
/// one customer already registered.
pub struct TestContext {
    pub store: MemoryStore,
    pub admin: Identity,
    pub customer: Identity,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        let admin = Self::seed_identity(&store, "admin@example.com", Role::Admin).await?;
        let customer = Self::seed_identity(&store, "customer@example.com", Role::Customer).await?;

        Ok(Self { store, admin, customer })
    }

    async fn seed_identity(store: &MemoryStore, email: &str, role: Role) -> anyhow::Result<Identity> {
        let profile = store
            .create_user(NewUser {
                email: email.to_string(),
                name: Some(email.split('@').next().unwrap_or(email).to_string()),
                password_hash: "not-a-real-hash".to_string(),
                role,
            })
            .await?;

        Ok(Identity {
            id: profile.id,
            role: profile.role,
            email: profile.email,
        })
    }

    /// Another customer, for ownership checks.
    pub async fn other_customer(&self) -> anyhow::Result<Identity> {
        let email = format!("other-{}@example.com", Uuid::new_v4().simple());
        Self::seed_identity(&self.store, &email, Role::Customer).await
    }

    pub fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            name: format!("Product {}", sku),
            description: format!("Description of {}", sku),
            price: Decimal::new(1250, 2),
            compare_at_price: None,
            sku: sku.to_string(),
            barcode: None,
            inventory: 10,
            weight: None,
            length: None,
            width: None,
            height: None,
            is_digital: false,
            digital_file_url: None,
            category_id: None,
        }
    }

    pub async fn product(&self, sku: &str) -> anyhow::Result<Product> {
        Ok(self.store.create_product(Self::new_product(sku)).await?)
    }

    pub async fn category(&self, name: &str, parent: Option<Uuid>) -> anyhow::Result<Category> {
        Ok(self
            .store
            .create_category(NewCategory {
                name: name.to_string(),
                description: None,
                parent_category_id: parent,
            })
            .await?)
    }

    pub fn new_address() -> NewAddress {
        NewAddress {
            street: "12 Market Street".to_string(),
            city: "Portland".to_string(),
            state: Some("OR".to_string()),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
            is_default: true,
        }
    }

    pub async fn address(&self, user_id: Uuid) -> anyhow::Result<Address> {
        Ok(self.store.create_address(user_id, Self::new_address()).await?)
    }

    /// A one-line order payload for `user_id` shipping to `address_id`.
    pub fn new_order(user_id: Uuid, address_id: Uuid, product: &Product) -> NewOrder {
        NewOrder {
            user_id,
            total: product.price,
            sub_total: product.price,
            tax: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            shipping_address_id: address_id,
            payment_method: PaymentMethod::CreditCard,
            order_items: vec![NewOrderItem {
                product_id: product.id,
                quantity: 1,
                price: product.price,
            }],
        }
    }
}
