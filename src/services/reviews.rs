use futures::try_join;
use uuid::Uuid;

use super::{require_identity, validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{NewReview, Review, ReviewPatch, ReviewWithAuthor};
use crate::database::store::{ProductStore, ReviewStore};
use crate::guard;
use crate::pagination::{PageRequest, PageResult};
use crate::types::{Action, ResourceKind};

/// Post a review as the user named in `review.user_id`.
pub async fn create_review<S: ReviewStore + ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    review: NewReview,
) -> ServiceResult<Review> {
    guard::check(caller, ResourceKind::Review, Action::Create, Some(review.user_id))?;
    validate::rating(review.rating)?;

    if store.find_product(review.product_id).await?.is_none() {
        return Err(ServiceError::not_found("Product not found"));
    }
    Ok(store.create_review(review).await?)
}

/// A product's reviews, newest first.
pub async fn list_reviews<S: ReviewStore + ProductStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    product_id: Uuid,
    page: PageRequest,
) -> ServiceResult<PageResult<ReviewWithAuthor>> {
    guard::check(caller, ResourceKind::Review, Action::List, None)?;
    let window = page.window()?;

    if store.find_product(product_id).await?.is_none() {
        return Err(ServiceError::not_found("Product not found"));
    }
    let (reviews, total) = try_join!(store.list_reviews(product_id, window), store.count_reviews(product_id))?;
    Ok(page.wrap(reviews, total)?)
}

async fn existing_review<S: ReviewStore + ?Sized>(store: &S, id: Uuid) -> ServiceResult<Review> {
    store
        .find_review(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Review not found"))
}

pub async fn update_review<S: ReviewStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    patch: ReviewPatch,
) -> ServiceResult<Review> {
    require_identity(caller)?;
    let review = existing_review(store, id).await?;
    guard::check(caller, ResourceKind::Review, Action::Update, Some(review.user_id))?;

    if let Some(rating) = patch.rating {
        validate::rating(rating)?;
    }
    Ok(store.update_review(id, patch).await?)
}

pub async fn delete_review<S: ReviewStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
) -> ServiceResult<Review> {
    require_identity(caller)?;
    let review = existing_review(store, id).await?;
    guard::check(caller, ResourceKind::Review, Action::Delete, Some(review.user_id))?;
    Ok(store.delete_review(id).await?)
}
