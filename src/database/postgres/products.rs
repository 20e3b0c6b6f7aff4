use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{like_pattern, PgStore};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    Category, NewProduct, Product, ProductDetail, ProductFilter, ProductImage, ProductListing, ProductPatch,
};
use crate::database::repository::Repository;
use crate::database::store::{ProductStore, StoreResult};
use crate::pagination::PageWindow;

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)
    AND ($2::uuid IS NULL OR category_id = $2)
"#;

impl PgStore {
    /// Attach categories and images to a page of products
    async fn hydrate_products(&self, products: Vec<Product>) -> StoreResult<Vec<ProductListing>> {
        let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let categories: HashMap<Uuid, Category> = Repository::<Category>::new("categories", self.pool())
            .select_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut images: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for image in Repository::<ProductImage>::new("product_images", self.pool())
            .select_any_of("product_id", &product_ids, "position, id")
            .await?
        {
            images.entry(image.product_id).or_default().push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductListing {
                category: product.category_id.and_then(|id| categories.get(&id).cloned()),
                images: images.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, name, description, price, compare_at_price, sku, barcode, inventory,
                weight, length, width, height, is_digital, digital_file_url, category_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_at_price)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.inventory)
        .bind(product.weight)
        .bind(product.length)
        .bind(product.width)
        .bind(product.height)
        .bind(product.is_digital)
        .bind(&product.digital_file_url)
        .bind(product.category_id)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Repository::<Product>::new("products", self.pool()).select_id(id).await
    }

    async fn product_detail(&self, id: Uuid) -> StoreResult<Option<ProductDetail>> {
        let Some(product) = self.find_product(id).await? else {
            return Ok(None);
        };

        let category = match product.category_id {
            Some(category_id) => {
                Repository::<Category>::new("categories", self.pool())
                    .select_id(category_id)
                    .await?
            }
            None => None,
        };
        let images = Repository::<ProductImage>::new("product_images", self.pool())
            .select_any_of("product_id", &[id], "position, id")
            .await?;
        let reviews = self.reviews_with_authors(id, None).await?;

        Ok(Some(ProductDetail {
            product,
            category,
            images,
            reviews,
        }))
    }

    async fn list_products(&self, filter: &ProductFilter, window: PageWindow) -> StoreResult<Vec<ProductListing>> {
        let sql = format!(
            "SELECT * FROM products WHERE {} ORDER BY created_at, id OFFSET $3 LIMIT $4",
            FILTER_CLAUSE
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.search_term().map(like_pattern))
            .bind(filter.category_id)
            .bind(window.skip)
            .bind(window.take)
            .fetch_all(self.pool())
            .await?;

        self.hydrate_products(products).await
    }

    async fn count_products(&self, filter: &ProductFilter) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM products WHERE {}", FILTER_CLAUSE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.search_term().map(like_pattern))
            .bind(filter.category_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let (set_category, category_id) = match patch.category_id {
            Some(category_id) => (true, category_id),
            None => (false, None),
        };

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                compare_at_price = COALESCE($5, compare_at_price),
                sku = COALESCE($6, sku),
                barcode = COALESCE($7, barcode),
                inventory = COALESCE($8, inventory),
                weight = COALESCE($9, weight),
                length = COALESCE($10, length),
                width = COALESCE($11, width),
                height = COALESCE($12, height),
                is_digital = COALESCE($13, is_digital),
                digital_file_url = COALESCE($14, digital_file_url),
                category_id = CASE WHEN $15 THEN $16 ELSE category_id END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.compare_at_price)
        .bind(patch.sku)
        .bind(patch.barcode)
        .bind(patch.inventory)
        .bind(patch.weight)
        .bind(patch.length)
        .bind(patch.width)
        .bind(patch.height)
        .bind(patch.is_digital)
        .bind(patch.digital_file_url)
        .bind(set_category)
        .bind(category_id)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Product not found"))
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        if Repository::<Product>::new("products", self.pool()).delete_id(id).await? {
            Ok(())
        } else {
            Err(DatabaseError::not_found("Product not found"))
        }
    }
}
