//! Request extractors and response wrappers shared by the resource routers.

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::error::ApiError;

/// `Json` extractor whose rejection is a `422` validation body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `200` with the JSON body when present, `204` with an empty body otherwise.
#[derive(Debug)]
pub struct OrNoContent<T>(pub Option<T>);

impl<T: Serialize> IntoResponse for OrNoContent<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Some(body) => Json(body).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

impl<T> From<Option<T>> for OrNoContent<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

/// Parse a path id. Anything that is not a whole integer, `12abc` included,
/// addresses no row.
#[must_use]
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
