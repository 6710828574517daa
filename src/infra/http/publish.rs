use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fieldnotes_relay_types::{METHOD_NOT_ALLOWED_MESSAGE, PublishRequest, RelayMessage};

use crate::application::{error::ErrorReport, relay::RelayError, relay::RelayService};

const SOURCE: &str = "infra::http::publish";

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::MissingConfiguration | RelayError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(RelayMessage::new(self.to_string()))).into_response();
        let report = match &self {
            RelayError::Upstream { path, .. } => {
                let mut report = ErrorReport::from_error(SOURCE, status, &self);
                report.messages.push(format!("failed path: {path}"));
                report
            }
            _ => ErrorReport::from_error(SOURCE, status, &self),
        };
        report.attach(&mut response);
        response
    }
}

fn message_response(source: &'static str, status: StatusCode, message: String) -> Response {
    let mut response = (status, Json(RelayMessage::new(message.clone()))).into_response();
    ErrorReport::from_message(source, status, message).attach(&mut response);
    response
}

pub(super) async fn publish(
    State(relay): State<RelayService>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            return message_response(SOURCE, rejection.status(), rejection.body_text());
        }
    };

    let request: PublishRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(err) => {
            return message_response(
                SOURCE,
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {err}"),
            );
        }
    };

    match relay.publish(request).await {
        Ok(success) => (StatusCode::OK, Json(success)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn method_not_allowed() -> Response {
    message_response(
        "infra::http::method",
        StatusCode::METHOD_NOT_ALLOWED,
        METHOD_NOT_ALLOWED_MESSAGE.to_string(),
    )
}
