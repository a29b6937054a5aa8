use async_trait::async_trait;
use eventboard_common::model::{
    Id, ModelValidationError,
    auth::{AuthTokenHash, Authentication},
    event::{Event, EventFields, EventMarker},
    post::Post,
    user::{User, UserMarker},
};
use mongodb::bson::document::ValueAccessError;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("A document in the database was missing a field: {0}")]
    Field(#[from] ValueAccessError),
    #[error(transparent)]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Persistence for events and the documents that hang off them.
///
/// Every mutation is one direct write. Nothing here spans a transaction, so an
/// ownership check done by the caller through [`EventStore::fetch_event`] can be
/// stale by the time [`EventStore::update_event`] or [`EventStore::delete_event`]
/// runs. Those two return `None` when the event vanished in between.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, owner: Id<UserMarker>, fields: &EventFields) -> Result<Event>;

    async fn fetch_events(&self) -> Result<Vec<Event>>;

    async fn fetch_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>>;

    /// Posts whose `externalId` is `event_id`. Empty when there are none.
    async fn fetch_event_posts(&self, event_id: Id<EventMarker>) -> Result<Vec<Post>>;

    /// Replaces name, description and location. Returns the event as stored afterwards.
    async fn update_event(
        &self,
        event_id: Id<EventMarker>,
        fields: &EventFields,
    ) -> Result<Option<Event>>;

    /// Returns the event as it was before deletion. Posts are left alone.
    async fn delete_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>>;

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>>;

    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>>;
}
