// handlers/protected/settings.rs - Store-wide key/value settings: /api/settings

use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};

use crate::database::models::{Setting, SettingType};
use crate::handlers::AppState;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Deleted, Keyed, Session};
use crate::services::settings;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    #[serde(rename = "type")]
    pub setting_type: Option<SettingType>,
}

/// Body of PUT /api/settings/:key. `type` defaults to GENERAL.
#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: Option<SettingType>,
}

#[derive(Debug, Serialize)]
pub struct SettingList {
    pub settings: Vec<Setting>,
}

/// GET /api/settings - Ordered by key; `?type=SHIPPING` narrows to one type
pub async fn settings_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiQuery(query): ApiQuery<SettingsQuery>,
) -> ApiResult<SettingList> {
    let settings = settings::list_settings(state.store.as_ref(), session.identity(), query.setting_type).await?;
    Ok(ApiResponse::success(SettingList { settings }))
}

/// GET /api/settings/:key
pub async fn setting_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<Keyed<Setting>> {
    let setting = settings::get_setting(state.store.as_ref(), session.identity(), &key).await?;
    Ok(ApiResponse::keyed("setting", setting))
}

/// PUT /api/settings/:key - Create or replace (admin)
pub async fn setting_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(key): ApiPath<String>,
    ApiJson(body): ApiJson<SettingValue>,
) -> ApiResult<Keyed<Setting>> {
    let setting_type = body.setting_type.unwrap_or(SettingType::General);
    let setting = settings::upsert_setting(state.store.as_ref(), session.identity(), &key, &body.value, setting_type).await?;
    Ok(ApiResponse::keyed("setting", setting))
}

/// DELETE /api/settings/:key (admin)
pub async fn setting_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<Deleted> {
    settings::delete_setting(state.store.as_ref(), session.identity(), &key).await?;
    Ok(ApiResponse::deleted())
}
