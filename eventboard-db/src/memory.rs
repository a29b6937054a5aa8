//! An [`EventStore`] kept entirely in process memory.
//!
//! Used by tests and local runs without a database. Events and posts keep
//! insertion order, like a collection scan without a sort.

use crate::store::{EventStore, Result};
use async_trait::async_trait;
use eventboard_common::model::{
    Id,
    auth::{AuthTokenHash, Authentication},
    event::{Event, EventFields, EventMarker},
    post::Post,
    user::{User, UserMarker, Username},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<Event>>,
    posts: RwLock<Vec<Post>>,
    users: RwLock<HashMap<Id<UserMarker>, User>>,
    authentications: RwLock<Vec<Authentication>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, username: Username) -> User {
        let user = User {
            id: Id::generate(),
            username,
        };
        self.users.write().await.insert(user.id, user.clone());

        user
    }

    pub async fn remove_user(&self, user_id: Id<UserMarker>) -> Option<User> {
        self.users.write().await.remove(&user_id)
    }

    pub async fn insert_authentication(&self, authentication: Authentication) {
        self.authentications.write().await.push(authentication);
    }

    pub async fn insert_post(
        &self,
        external_id: Id<EventMarker>,
        content: Map<String, Value>,
    ) -> Post {
        let post = Post {
            id: Id::generate(),
            external_id,
            content,
        };
        self.posts.write().await.push(post.clone());

        post
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, owner: Id<UserMarker>, fields: &EventFields) -> Result<Event> {
        let event = Event {
            id: Id::generate(),
            owner,
            fields: fields.clone(),
        };
        self.events.write().await.push(event.clone());

        debug!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn fetch_events(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().await.clone())
    }

    async fn fetch_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|event| event.id == event_id).cloned())
    }

    async fn fetch_event_posts(&self, event_id: Id<EventMarker>) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|post| post.external_id == event_id)
            .cloned()
            .collect())
    }

    async fn update_event(
        &self,
        event_id: Id<EventMarker>,
        fields: &EventFields,
    ) -> Result<Option<Event>> {
        let mut events = self.events.write().await;
        let updated = events
            .iter_mut()
            .find(|event| event.id == event_id)
            .map(|event| {
                event.fields = fields.clone();
                event.clone()
            });

        Ok(updated)
    }

    async fn delete_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>> {
        let mut events = self.events.write().await;
        let deleted = events
            .iter()
            .position(|event| event.id == event_id)
            .map(|index| events.remove(index));

        Ok(deleted)
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>> {
        let authentications = self.authentications.read().await;
        Ok(authentications
            .iter()
            .find(|authentication| &authentication.token_hash == token_hash)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use crate::{memory::MemoryStore, store::EventStore};
    use eventboard_common::model::{
        Id,
        event::{EventFields, Location},
        user::Username,
    };
    use serde_json::{Map, Number, json};

    fn fields(name: &str) -> EventFields {
        EventFields {
            event_name: name.to_owned(),
            event_description: "Bring gloves".to_owned(),
            location: Location {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                state: "IL".to_owned(),
                zip_code: Number::from(62701),
            },
        }
    }

    #[tokio::test]
    async fn events_keep_insertion_order() {
        let store = MemoryStore::new();
        let owner = Id::generate();

        let first = store.create_event(owner, &fields("first")).await.unwrap();
        let second = store.create_event(owner, &fields("second")).await.unwrap();

        assert_eq!(store.fetch_events().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn update_replaces_fields_only() {
        let store = MemoryStore::new();
        let owner = Id::generate();
        let created = store.create_event(owner, &fields("before")).await.unwrap();

        let updated = store
            .update_event(created.id, &fields("after"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.owner, owner);
        assert_eq!(updated.fields.event_name, "after");
        assert_eq!(store.fetch_events().await.unwrap(), vec![updated]);
        assert_eq!(
            store.update_event(Id::generate(), &fields("x")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn delete_leaves_posts() {
        let store = MemoryStore::new();
        let created = store
            .create_event(Id::generate(), &fields("party"))
            .await
            .unwrap();
        let mut content = Map::new();
        content.insert("title".to_owned(), json!("See you there"));
        let post = store.insert_post(created.id, content).await;
        store.insert_post(Id::generate(), Map::new()).await;

        assert_eq!(
            store.fetch_event_posts(created.id).await.unwrap(),
            vec![post.clone()]
        );

        assert_eq!(store.delete_event(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.delete_event(created.id).await.unwrap(), None);
        assert_eq!(store.fetch_event(created.id).await.unwrap(), None);
        assert_eq!(store.fetch_event_posts(created.id).await.unwrap(), vec![post]);
    }

    #[tokio::test]
    async fn users() {
        let store = MemoryStore::new();
        let user = store.insert_user(Username::new("ada".to_owned()).unwrap()).await;

        assert_eq!(store.fetch_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.fetch_user(Id::generate()).await.unwrap(), None);
    }
}
