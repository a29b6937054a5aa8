use crate::server::{Result, ServerError};
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use eventboard_common::model::{event::Event, post::Post};
use headers::ContentType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON responder whose serialization failures go through [`ServerError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(json) => (TypedHeader(ContentType::json()), json).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

/// A request body that is read up front but only parsed when the handler asks.
///
/// Handlers decode it after their id and ownership checks, so a bad body never
/// hides a 404 or 401. A body not labelled as JSON, or an empty one, reads as `{}`.
#[derive(Clone, Debug)]
pub struct JsonBody {
    bytes: Bytes,
    is_json: bool,
}

impl JsonBody {
    pub fn decode(&self) -> Result<Value> {
        if !self.is_json || self.bytes.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_slice(&self.bytes).map_err(ServerError::MalformedBody)
    }
}

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(request.headers());
        let bytes = Bytes::from_request(request, state).await?;

        Ok(Self { bytes, is_json })
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .is_some_and(|essence| essence == "application/json" || essence.ends_with("+json"))
}

/// Body of every error reply.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithPosts {
    pub event_info: Event,
    pub post_info: Vec<Post>,
}
