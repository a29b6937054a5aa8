use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use eventboard_common::model::{
    Id,
    auth::AuthToken,
    user::{User, UserMarker, Username},
};
use eventboard_db::store::EventStore;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use time::UtcDateTime;
use tracing::debug;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The caller, resolved from a bearer token issued by the login service.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser {
    user: User,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(&self) -> Id<UserMarker> {
        self.user.id
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.user.username
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn EventStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let token_hash = request_token.hash()?;
        let store = Arc::<dyn EventStore>::from_ref(state);

        let authentication = store
            .fetch_authentication(&token_hash)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        if authentication.user != request_token.user_id
            || authentication.is_expired_at(UtcDateTime::now())
        {
            return Err(ServerError::InvalidToken);
        }

        let user = store
            .fetch_user(authentication.user)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        debug!(user_id = %user.id, "Authenticated request");
        Ok(Self { user })
    }
}
