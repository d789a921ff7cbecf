use crate::domain::models::{CommandError, ParseCommandError, Reply};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use tracing::error;

/// The reply body sent back to the chat transport. Errors use the `text` shape too, so the
/// transport can always forward what it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyResponseData {
    Text {
        text: String,
    },
    Photo {
        caption: String,
        image_png_base64: String,
    },
}

impl From<Reply> for ReplyResponseData {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Text(text) => ReplyResponseData::Text { text },
            Reply::Photo { png, caption } => ReplyResponseData::Photo {
                caption,
                image_png_base64: STANDARD.encode(png),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSuccess(StatusCode, Json<ReplyResponseData>);

impl ApiSuccess {
    pub fn new(status: StatusCode, data: ReplyResponseData) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl IntoResponse for ApiSuccess {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        error!("{err}");
        Self::InternalServerError(err.user_message().to_string())
    }
}

impl From<ParseCommandError> for ApiError {
    fn from(err: ParseCommandError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, text) = match self {
            ApiError::InternalServerError(text) => (StatusCode::INTERNAL_SERVER_ERROR, text),
            ApiError::UnprocessableEntity(text) => (StatusCode::UNPROCESSABLE_ENTITY, text),
        };

        (status, Json(ReplyResponseData::Text { text })).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reply_wire_format() {
        let text = serde_json::to_value(ReplyResponseData::from(Reply::text("Hi"))).unwrap();
        assert_eq!(text, serde_json::json!({ "kind": "text", "text": "Hi" }));

        let photo = serde_json::to_value(ReplyResponseData::from(Reply::Photo {
            png: b"png".to_vec(),
            caption: "City: London".to_string(),
        }))
        .unwrap();
        assert_eq!(
            photo,
            serde_json::json!({
                "kind": "photo",
                "caption": "City: London",
                "image_png_base64": "cG5n",
            })
        );
    }

    #[test]
    fn test_errors_keep_internals_out_of_the_reply() {
        let err = ApiError::from(CommandError::Rendering(anyhow::anyhow!(
            "resvg: out of memory"
        )));

        match err {
            ApiError::InternalServerError(text) => assert!(!text.contains("resvg")),
            other => panic!("Unexpected {other:?}"),
        }
    }
}
