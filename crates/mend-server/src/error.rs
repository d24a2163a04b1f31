//! Mapping of `MendError` onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mend_core::{ErrorBody, MendError};

/// Handler error; renders as `{"detail": "..."}` with a status per variant
#[derive(Debug)]
pub struct ApiError(pub MendError);

impl From<MendError> for ApiError {
    fn from(err: MendError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MendError::NotFound(_) => StatusCode::NOT_FOUND,
            MendError::InvalidInput(_) | MendError::Vcs { .. } => StatusCode::BAD_REQUEST,
            MendError::Api(_) => StatusCode::BAD_GATEWAY,
            MendError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            MendError::Auth(_)
            | MendError::GitCommand(_)
            | MendError::Config(_)
            | MendError::Io(_)
            | MendError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.0.to_string();

        if status.is_server_error() {
            tracing::error!("{} {}", status, detail);
        } else {
            tracing::debug!("{} {}", status, detail);
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mend_core::GitStep;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MendError::NotFound("File not found".into()), StatusCode::NOT_FOUND),
            (MendError::InvalidInput("..".into()), StatusCode::BAD_REQUEST),
            (
                MendError::Vcs {
                    step: GitStep::Push,
                    stderr: "denied".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (MendError::Api("429".into()), StatusCode::BAD_GATEWAY),
            (MendError::Timeout("git clone".into()), StatusCode::GATEWAY_TIMEOUT),
            (MendError::Auth("no key".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_body_is_detail_object() {
        let response = ApiError(MendError::NotFound("Repository not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"detail": "Repository not found"}));
    }
}
