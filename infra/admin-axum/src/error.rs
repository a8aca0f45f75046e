use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gantry_admin::AdminError;
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// Errors returned by the admin routes.
#[gantry_derive::gantry_error]
pub enum AdminHttpError {
    #[error("{source}{}", format_context(.context))]
    Admin { source: AdminError, context: Option<Cow<'static, str>> },
    #[error("Bad request{}: {message}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Internal admin error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AdminHttpError {
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Admin { source: AdminError::NotFound { .. }, .. } => StatusCode::NOT_FOUND,
            Self::Admin { source: AdminError::Validation { .. }, .. } | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Admin { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminHttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Admin request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
