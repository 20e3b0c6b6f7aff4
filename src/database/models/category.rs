use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category as listed. `sub_categories` is only populated when the
/// listing asked for subcategories.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    #[serde(flatten)]
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_categories: Option<Vec<Category>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub sub_categories: Vec<Category>,
    pub parent_category: Option<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` detaches the category from its parent.
    #[serde(default, deserialize_with = "super::double_option")]
    pub parent_category_id: Option<Option<Uuid>>,
}

/// Group `all` into listings, attaching each category's direct children.
pub fn with_children(all: Vec<Category>) -> Vec<CategoryListing> {
    all.iter()
        .map(|category| CategoryListing {
            category: category.clone(),
            sub_categories: Some(
                all.iter()
                    .filter(|c| c.parent_category_id == Some(category.id))
                    .cloned()
                    .collect(),
            ),
        })
        .collect()
}
