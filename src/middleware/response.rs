use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::pagination::PageResult;

/// Successful JSON response with an optional non-200 status
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }
}

impl<T: Serialize> ApiResponse<Keyed<T>> {
    /// `{key: value}` with 200
    pub fn keyed(key: &'static str, value: T) -> Self {
        Self::success(Keyed { key, value })
    }

    /// `{key: value}` with 201
    pub fn created(key: &'static str, value: T) -> Self {
        Self::with_status(Keyed { key, value }, StatusCode::CREATED)
    }
}

impl<T: Serialize> ApiResponse<Listing<T>> {
    /// `{key: [items], "pagination": {...}}`
    pub fn listing(key: &'static str, page: PageResult<T>) -> Self {
        Self::success(Listing { key, page })
    }
}

impl ApiResponse<Deleted> {
    /// `{"success": true}`
    pub fn deleted() -> Self {
        Self::success(Deleted)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to serialize response data" })),
                )
                    .into_response()
            }
        }
    }
}

/// A single resource under its name.
#[derive(Debug)]
pub struct Keyed<T> {
    key: &'static str,
    value: T,
}

impl<T: Serialize> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.value)?;
        map.end()
    }
}

/// A page of resources under their plural name, with pagination metadata.
#[derive(Debug)]
pub struct Listing<T> {
    key: &'static str,
    page: PageResult<T>,
}

impl<T: Serialize> Serialize for Listing<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.page.items)?;
        map.serialize_entry("pagination", &self.page.pagination())?;
        map.end()
    }
}

#[derive(Debug)]
pub struct Deleted;

impl Serialize for Deleted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("success", &true)?;
        map.end()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::wrap;

    #[test]
    fn keyed_bodies_nest_under_their_name() {
        let body = serde_json::to_value(Keyed { key: "product", value: json!({"id": 1}) }).unwrap();
        assert_eq!(body, json!({ "product": { "id": 1 } }));
    }

    #[test]
    fn listings_carry_pagination() {
        let page = wrap(vec!["a", "b"], 5, 1, 2).unwrap();
        let body = serde_json::to_value(Listing { key: "orders", page }).unwrap();
        assert_eq!(
            body,
            json!({
                "orders": ["a", "b"],
                "pagination": { "total": 5, "pages": 3, "page": 1, "limit": 2 }
            })
        );
    }

    #[test]
    fn deletions_report_success() {
        assert_eq!(serde_json::to_value(Deleted).unwrap(), json!({ "success": true }));
        assert_eq!(ApiResponse::deleted().into_response().status(), StatusCode::OK);
        assert_eq!(
            ApiResponse::created("user", json!({})).into_response().status(),
            StatusCode::CREATED
        );
    }
}
