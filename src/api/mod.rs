//! REST API module.
//!
//! Handlers extract the caller and the request, hand both to a service and
//! wrap the outcome in the response envelopes below.

mod games;
mod scores;
mod users;

pub use games::*;
pub use scores::*;
pub use users::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::query::{Detail, Page};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// List envelope: pagination metadata next to the page of records.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: Page,
}

impl From<Page> for ListResponse {
    fn from(page: Page) -> Self {
        Self {
            success: true,
            page,
        }
    }
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A detail read answered either by one record or by a whole list.
pub struct DetailResponse(pub Detail);

impl IntoResponse for DetailResponse {
    fn into_response(self) -> Response {
        match self.0 {
            Detail::Record(record) => ApiResponse::new(record).into_response(),
            Detail::Collection(page) => ListResponse::from(page).into_response(),
        }
    }
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a `201 Created` response.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::CREATED,
        ..ApiResponse::new(data)
    })
}

/// Create a response that carries only a message.
pub fn message(text: &str) -> ApiResult<()> {
    Ok(ApiResponse {
        status: StatusCode::OK,
        success: true,
        data: None,
        message: Some(text.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Pagination;
    use serde_json::json;

    #[test]
    fn test_message_envelope_omits_data() {
        let response = message("Game deactivated successfully").unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({ "success": true, "message": "Game deactivated successfully" }));
    }

    #[test]
    fn test_created_status() {
        let response = created(json!({ "id": "g1" })).unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[test]
    fn test_list_envelope_is_flat() {
        let page = Page::new(&Pagination::build(10, None, None), 0, Vec::new());
        let json = serde_json::to_value(ListResponse::from(page)).unwrap();
        assert_eq!(
            json,
            json!({ "success": true, "count": 0, "page": 1, "limit": 10, "totalPages": 0, "data": [] })
        );
    }
}
