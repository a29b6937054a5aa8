use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{BytesRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use eventboard_common::{
    model::{
        Id, InvalidIdError,
        auth::{AuthTokenDecodeError, AuthTokenHashError},
        event::EventMarker,
        user::UserMarker,
    },
    validation::InvalidEventField,
};
use eventboard_db::store::{DbError, EventStore};
use response::{ErrorResponse, Json};
use std::{any::Any, sync::Arc};
use thiserror::Error;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

mod auth;
mod response;
mod routes;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Check the server console";

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: Arc<dyn EventStore>,
}

pub fn routes() -> ServerRouter {
    routes::routes()
        .fallback(fallback)
        .method_not_allowed_fallback(fallback)
}

/// The full request pipeline, outermost stage last.
pub fn app(state: ServerState) -> Router {
    routes()
        .with_state(state)
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ServerError::Panic(detail.to_owned()).into_response()
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Request body could not be read: {0}")]
    BodyRejection(#[from] BytesRejection),
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(serde_json::Error),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided auth token could not be decoded: {0}")]
    InvalidAuthToken(#[from] AuthTokenDecodeError),
    #[error("The auth token could not be hashed: {0}")]
    AuthTokenHash(#[from] AuthTokenHashError),
    #[error("Provided token was invalid")]
    InvalidToken,
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    InvalidField(#[from] InvalidEventField),
    #[error("Malformed event id: {0}")]
    MalformedEventId(#[from] InvalidIdError),
    #[error("Event with id {0} was not found.")]
    EventNotFound(Id<EventMarker>),
    #[error("Not Authorized.")]
    NotOwner,
    #[error("Owner {owner} of event {event} does not exist.")]
    OwnerMissing {
        event: Id<EventMarker>,
        owner: Id<UserMarker>,
    },
    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::MalformedEventId(_)
            | ServerError::EventNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken | ServerError::NotOwner => StatusCode::UNAUTHORIZED,
            ServerError::BodyRejection(rejection) => rejection.status(),
            ServerError::MalformedBody(_)
            | ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidAuthToken(_)
            | ServerError::InvalidField(_)
            | ServerError::Database(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::AuthTokenHash(_)
            | ServerError::OwnerMissing { .. }
            | ServerError::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client gets to see. Server errors never leak their cause.
    pub fn error_message(&self) -> String {
        match self {
            ServerError::UnknownRoute(_) => "This route does not exist".to_owned(),
            ServerError::MalformedEventId(_) => "Event ID is incorrect.".to_owned(),
            ServerError::EventNotFound(_) => "Event doesn't exist".to_owned(),
            _ if self.status().is_server_error() => INTERNAL_ERROR_MESSAGE.to_owned(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            warn!(error = %self, %status, "Replying with error");
        }

        let error_response = ErrorResponse {
            error_message: self.error_message(),
        };
        (status, Json(error_response)).into_response()
    }
}
