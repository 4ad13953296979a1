use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// `{ "statusCode": .., "data": { "message": [..], ...payload } }`
///
/// The payload must serialize to a JSON object; its fields sit next to
/// `message`.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    payload: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Body<'a, T> {
    status_code: u16,
    data: Data<'a, T>,
}

#[derive(Serialize)]
struct Data<'a, T> {
    message: [&'a str; 1],
    #[serde(flatten)]
    payload: &'a T,
}

/// Payload for responses that only carry a message.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self::with_status(StatusCode::OK, message, payload)
    }

    pub fn created(message: impl Into<String>, payload: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, payload)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, payload: T) -> Self {
        Self {
            status,
            message: message.into(),
            payload,
        }
    }
}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, Empty {})
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Body {
            status_code: self.status.as_u16(),
            data: Data {
                message: [self.message.as_str()],
                payload: &self.payload,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
