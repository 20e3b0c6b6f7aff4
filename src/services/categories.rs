use std::collections::HashSet;

use uuid::Uuid;

use super::{validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{Category, CategoryDetail, CategoryListing, CategoryPatch, NewCategory};
use crate::database::store::CategoryStore;
use crate::guard;
use crate::types::{Action, ResourceKind};

pub async fn create_category<S: CategoryStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    category: NewCategory,
) -> ServiceResult<Category> {
    guard::check(caller, ResourceKind::Category, Action::Create, None)?;
    validate::non_empty("name", &category.name)?;
    Ok(store.create_category(category).await?)
}

pub async fn list_categories<S: CategoryStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    include_subcategories: bool,
) -> ServiceResult<Vec<CategoryListing>> {
    guard::check(caller, ResourceKind::Category, Action::List, None)?;
    Ok(store.list_categories(include_subcategories).await?)
}

pub async fn get_category<S: CategoryStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<CategoryDetail> {
    guard::check(caller, ResourceKind::Category, Action::Read, None)?;
    store
        .category_detail(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Category not found"))
}

pub async fn update_category<S: CategoryStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    patch: CategoryPatch,
) -> ServiceResult<Category> {
    guard::check(caller, ResourceKind::Category, Action::Update, None)?;
    validate::non_empty_opt("name", patch.name.as_deref())?;
    if let Some(Some(parent)) = patch.parent_category_id {
        reject_cycle(store, id, parent).await?;
    }
    Ok(store.update_category(id, patch).await?)
}

/// Walk up from `parent`; reaching `id` means the move would close a loop.
async fn reject_cycle<S: CategoryStore + ?Sized>(store: &S, id: Uuid, parent: Uuid) -> ServiceResult<()> {
    let mut seen = HashSet::new();
    let mut next = Some(parent);
    while let Some(current) = next {
        if current == id {
            return Err(ServiceError::validation("A category cannot be its own ancestor"));
        }
        if !seen.insert(current) {
            break;
        }
        next = store
            .category_detail(current)
            .await?
            .and_then(|detail| detail.category.parent_category_id);
    }
    Ok(())
}

/// Delete a category. Its products stay, with no category.
pub async fn delete_category<S: CategoryStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<Category> {
    guard::check(caller, ResourceKind::Category, Action::Delete, None)?;
    let deleted = store.delete_category(id).await?;
    tracing::info!(category_id = %id, "Deleted category");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::ProductStore;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn deleting_a_category_keeps_its_products() {
        let ctx = TestContext::new().await.unwrap();
        let category = ctx.category("Kitchen", None).await.unwrap();
        let mut product = TestContext::new_product("KETTLE");
        product.category_id = Some(category.id);
        let product = ctx.store.create_product(product).await.unwrap();

        delete_category(&ctx.store, Some(&ctx.admin), category.id).await.unwrap();

        let product = ctx.store.find_product(product.id).await.unwrap().unwrap();
        assert_eq!(product.category_id, None);
        assert!(matches!(
            get_category(&ctx.store, None, category.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_is_top_level_unless_subcategories_requested() {
        let ctx = TestContext::new().await.unwrap();
        let parent = ctx.category("Home", None).await.unwrap();
        ctx.category("Bath", Some(parent.id)).await.unwrap();

        let top = list_categories(&ctx.store, None, false).await.unwrap();
        assert_eq!(top.len(), 1);
        assert!(top[0].sub_categories.is_none());

        let all = list_categories(&ctx.store, None, true).await.unwrap();
        assert_eq!(all.len(), 2);
        let home = all.iter().find(|c| c.category.id == parent.id).unwrap();
        assert_eq!(home.sub_categories.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn detail_carries_parent_and_children() {
        let ctx = TestContext::new().await.unwrap();
        let parent = ctx.category("Garden", None).await.unwrap();
        let child = ctx.category("Tools", Some(parent.id)).await.unwrap();

        let detail = get_category(&ctx.store, None, child.id).await.unwrap();
        assert_eq!(detail.parent_category.map(|c| c.id), Some(parent.id));

        let detail = get_category(&ctx.store, None, parent.id).await.unwrap();
        assert_eq!(detail.sub_categories.len(), 1);
    }

    #[tokio::test]
    async fn customers_cannot_edit_categories() {
        let ctx = TestContext::new().await.unwrap();
        let category = ctx.category("Toys", None).await.unwrap();

        let result = update_category(&ctx.store, Some(&ctx.customer), category.id, CategoryPatch::default()).await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));

        let own_parent = CategoryPatch {
            parent_category_id: Some(Some(category.id)),
            ..Default::default()
        };
        let result = update_category(&ctx.store, Some(&ctx.admin), category.id, own_parent).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn reparenting_under_a_descendant_is_rejected() {
        let ctx = TestContext::new().await.unwrap();
        let top = ctx.category("Sports", None).await.unwrap();
        let middle = ctx.category("Ball Games", Some(top.id)).await.unwrap();
        let leaf = ctx.category("Tennis", Some(middle.id)).await.unwrap();
        let admin = Some(&ctx.admin);

        for descendant in [middle.id, leaf.id] {
            let patch = CategoryPatch {
                parent_category_id: Some(Some(descendant)),
                ..Default::default()
            };
            let result = update_category(&ctx.store, admin, top.id, patch).await;
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }
        let unchanged = get_category(&ctx.store, None, top.id).await.unwrap();
        assert_eq!(unchanged.category.parent_category_id, None);

        // Moving sideways is still fine
        let other = ctx.category("Outdoor", None).await.unwrap();
        let patch = CategoryPatch {
            parent_category_id: Some(Some(other.id)),
            ..Default::default()
        };
        let moved = update_category(&ctx.store, admin, leaf.id, patch).await.unwrap();
        assert_eq!(moved.parent_category_id, Some(other.id));
    }
}
