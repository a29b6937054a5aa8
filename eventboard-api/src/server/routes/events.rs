use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    response::{EventWithPosts, Json, JsonBody},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use eventboard_common::model::{
    Id,
    event::{Event, EventFields, EventMarker},
};
use eventboard_db::store::EventStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_event)
        .typed_get(list_events)
        .typed_get(get_event)
        .typed_patch(update_event)
        .typed_delete(delete_event)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
struct EventsPath();

/// The id stays a plain string here so a malformed one can be answered with
/// our own 404 instead of a path rejection.
#[derive(TypedPath, Deserialize)]
#[typed_path("/{event_id}", rejection(ServerError))]
struct EventPath {
    event_id: String,
}

async fn create_event(
    EventsPath(): EventsPath,
    State(store): State<Arc<dyn EventStore>>,
    user: AuthenticatedUser,
    body: JsonBody,
) -> Result<Json<Event>> {
    let fields = EventFields::from_payload(&body.decode()?)?;
    let event = store.create_event(user.user_id(), &fields).await?;

    info!(event_id = %event.id, owner = %event.owner, "Created event");
    Ok(Json(event))
}

async fn list_events(
    EventsPath(): EventsPath,
    State(store): State<Arc<dyn EventStore>>,
) -> Result<Json<Vec<Event>>> {
    let events = store.fetch_events().await?;

    Ok(Json(events))
}

async fn get_event(
    EventPath { event_id }: EventPath,
    State(store): State<Arc<dyn EventStore>>,
) -> Result<Json<EventWithPosts>> {
    let event_id = Id::parse(&event_id)?;

    let event_info = store
        .fetch_event(event_id)
        .await?
        .ok_or(ServerError::EventNotFound(event_id))?;
    let post_info = store.fetch_event_posts(event_id).await?;

    Ok(Json(EventWithPosts {
        event_info,
        post_info,
    }))
}

async fn update_event(
    EventPath { event_id }: EventPath,
    State(store): State<Arc<dyn EventStore>>,
    user: AuthenticatedUser,
    body: JsonBody,
) -> Result<Json<Event>> {
    let event_id = Id::parse(&event_id)?;
    fetch_owned_event(store.as_ref(), event_id, &user).await?;

    let fields = EventFields::from_payload(&body.decode()?)?;

    // None here means the event was deleted after the ownership check.
    let event = store
        .update_event(event_id, &fields)
        .await?
        .ok_or(ServerError::EventNotFound(event_id))?;

    info!(%event_id, "Updated event");
    Ok(Json(event))
}

async fn delete_event(
    EventPath { event_id }: EventPath,
    State(store): State<Arc<dyn EventStore>>,
    user: AuthenticatedUser,
) -> Result<Json<Event>> {
    let event_id = Id::parse(&event_id)?;
    fetch_owned_event(store.as_ref(), event_id, &user).await?;

    let event = store
        .delete_event(event_id)
        .await?
        .ok_or(ServerError::EventNotFound(event_id))?;

    info!(%event_id, "Deleted event");
    Ok(Json(event))
}

/// Loads the event and its owner, and fails unless the caller is that owner.
///
/// Ownership is decided by username, not by user id.
async fn fetch_owned_event(
    store: &dyn EventStore,
    event_id: Id<EventMarker>,
    user: &AuthenticatedUser,
) -> Result<Event> {
    let event = store
        .fetch_event(event_id)
        .await?
        .ok_or(ServerError::EventNotFound(event_id))?;

    let owner = store
        .fetch_user(event.owner)
        .await?
        .ok_or(ServerError::OwnerMissing {
            event: event_id,
            owner: event.owner,
        })?;

    if owner.username != *user.username() {
        return Err(ServerError::NotOwner);
    }

    Ok(event)
}
