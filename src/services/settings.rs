use super::{validate, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{Setting, SettingType};
use crate::database::store::SettingStore;
use crate::guard;
use crate::types::{Action, ResourceKind};

/// Create the setting, or replace the value and type of an existing key.
pub async fn upsert_setting<S: SettingStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    key: &str,
    value: &str,
    setting_type: SettingType,
) -> ServiceResult<Setting> {
    guard::check(caller, ResourceKind::Setting, Action::Update, None)?;
    validate::non_empty("key", key)?;
    let setting = store.upsert_setting(key.trim(), value, setting_type).await?;
    tracing::info!(key = %setting.key, setting_type = ?setting.setting_type, "Setting saved");
    Ok(setting)
}

pub async fn get_setting<S: SettingStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    key: &str,
) -> ServiceResult<Setting> {
    guard::check(caller, ResourceKind::Setting, Action::Read, None)?;
    store
        .find_setting(key)
        .await?
        .ok_or_else(|| ServiceError::not_found("Setting not found"))
}

/// All settings ordered by key, optionally of one type.
pub async fn list_settings<S: SettingStore + ?Sized>(
    store: &S,
    caller: Option<&Identity>,
    setting_type: Option<SettingType>,
) -> ServiceResult<Vec<Setting>> {
    guard::check(caller, ResourceKind::Setting, Action::List, None)?;
    Ok(store.list_settings(setting_type).await?)
}

pub async fn delete_setting<S: SettingStore + ?Sized>(store: &S, caller: Option<&Identity>, key: &str) -> ServiceResult<()> {
    guard::check(caller, ResourceKind::Setting, Action::Delete, None)?;
    if !store.delete_setting(key).await? {
        return Err(ServiceError::not_found("Setting not found"));
    }
    Ok(())
}
