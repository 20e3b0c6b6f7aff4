use uuid::Uuid;

use super::{require_identity, validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{Address, AddressPatch, NewAddress};
use crate::database::store::AddressStore;
use crate::guard;
use crate::types::{Action, ResourceKind};

pub async fn list_addresses<S: AddressStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
) -> ServiceResult<Vec<Address>> {
    guard::check(caller, ResourceKind::Address, Action::List, Some(user_id))?;
    Ok(store.list_addresses(user_id).await?)
}

pub async fn create_address<S: AddressStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    user_id: Uuid,
    address: NewAddress,
) -> ServiceResult<Address> {
    guard::check(caller, ResourceKind::Address, Action::Create, Some(user_id))?;
    validate::non_empty("street", &address.street)?;
    validate::non_empty("city", &address.city)?;
    validate::non_empty("postal_code", &address.postal_code)?;
    validate::non_empty("country", &address.country)?;
    Ok(store.create_address(user_id, address).await?)
}

async fn existing_address<S: AddressStore + ?Sized>(store: &S, id: Uuid) -> ServiceResult<Address> {
    store
        .find_address(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Address not found"))
}

pub async fn update_address<S: AddressStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    id: Uuid,
    patch: AddressPatch,
) -> ServiceResult<Address> {
    require_identity(caller)?;
    let address = existing_address(store, id).await?;
    guard::check(caller, ResourceKind::Address, Action::Update, Some(address.user_id))?;

    validate::non_empty_opt("street", patch.street.as_deref())?;
    validate::non_empty_opt("city", patch.city.as_deref())?;
    validate::non_empty_opt("postal_code", patch.postal_code.as_deref())?;
    validate::non_empty_opt("country", patch.country.as_deref())?;
    Ok(store.update_address(id, patch).await?)
}

/// Addresses that orders ship to cannot be deleted.
pub async fn delete_address<S: AddressStore + ?Sized>(store: &S, caller: Option<&Identity>, id: Uuid) -> ServiceResult<()> {
    require_identity(caller)?;
    let address = existing_address(store, id).await?;
    guard::check(caller, ResourceKind::Address, Action::Delete, Some(address.user_id))?;
    Ok(store.delete_address(id).await?)
}
