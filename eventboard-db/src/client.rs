use crate::{
    record::{EventRecord, LocationRecord, SessionRecord, UserRecord, post_from_document},
    store::{EventStore, Result},
};
use async_trait::async_trait;
use eventboard_common::model::{
    Id,
    auth::{AuthTokenHash, Authentication},
    event::{Event, EventFields, EventMarker},
    post::Post,
    user::{User, UserMarker},
};
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Binary, Document, doc, spec::BinarySubtype, to_bson},
    options::{ClientOptions, ReturnDocument},
};
use std::time::Duration;
use tracing::{info, instrument};

pub const EVENTS_COLLECTION: &str = "events";
pub const POSTS_COLLECTION: &str = "posts";
pub const USERS_COLLECTION: &str = "users";
pub const SESSIONS_COLLECTION: &str = "sessions";

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub connect_timeout_secs: u64,
}

/// Connects and pings, so a bad URL or an unreachable server fails at startup.
pub async fn connect(config: &MongoConfig) -> Result<Database> {
    info!(database = %config.database, "Connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.app_name.clone_from(&config.app_name);

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);
    database.run_command(doc! { "ping": 1 }).await?;

    info!(database = %config.database, "Connected to MongoDB");
    Ok(database)
}

#[derive(Clone, Debug)]
pub struct DbClient {
    events: Collection<EventRecord>,
    posts: Collection<Document>,
    users: Collection<UserRecord>,
    sessions: Collection<SessionRecord>,
}

impl DbClient {
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            events: database.collection(EVENTS_COLLECTION),
            posts: database.collection(POSTS_COLLECTION),
            users: database.collection(USERS_COLLECTION),
            sessions: database.collection(SESSIONS_COLLECTION),
        }
    }
}

#[async_trait]
impl EventStore for DbClient {
    #[instrument(skip(self, fields))]
    async fn create_event(&self, owner: Id<UserMarker>, fields: &EventFields) -> Result<Event> {
        let record = EventRecord::new(owner, fields);
        self.events.insert_one(&record).await?;

        Ok(record.into())
    }

    #[instrument(skip(self))]
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        let records: Vec<EventRecord> = self.events.find(doc! {}).await?.try_collect().await?;

        Ok(records.into_iter().map(Event::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>> {
        let record = self
            .events
            .find_one(doc! { "_id": event_id.object_id() })
            .await?;

        Ok(record.map(Event::from))
    }

    #[instrument(skip(self))]
    async fn fetch_event_posts(&self, event_id: Id<EventMarker>) -> Result<Vec<Post>> {
        let documents: Vec<Document> = self
            .posts
            .find(doc! { "externalId": event_id.object_id() })
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(post_from_document).collect()
    }

    #[instrument(skip(self, fields))]
    async fn update_event(
        &self,
        event_id: Id<EventMarker>,
        fields: &EventFields,
    ) -> Result<Option<Event>> {
        let update = doc! {
            "$set": {
                "eventName": fields.event_name.as_str(),
                "eventDescription": fields.event_description.as_str(),
                "location": to_bson(&LocationRecord::from(fields.location.clone()))?,
            }
        };

        let record = self
            .events
            .find_one_and_update(doc! { "_id": event_id.object_id() }, update)
            .return_document(ReturnDocument::After)
            .await?;

        Ok(record.map(Event::from))
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, event_id: Id<EventMarker>) -> Result<Option<Event>> {
        let record = self
            .events
            .find_one_and_delete(doc! { "_id": event_id.object_id() })
            .await?;

        Ok(record.map(Event::from))
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = self
            .users
            .find_one(doc! { "_id": user_id.object_id() })
            .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    #[instrument(skip_all)]
    async fn fetch_authentication(
        &self,
        token_hash: &AuthTokenHash,
    ) -> Result<Option<Authentication>> {
        let token_hash = Binary {
            subtype: BinarySubtype::Generic,
            bytes: token_hash.as_bytes().to_vec(),
        };

        let record = self
            .sessions
            .find_one(doc! { "tokenHash": token_hash })
            .await?;

        let authentication = record.map(Authentication::try_from).transpose()?;
        Ok(authentication)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{DbClient, MongoConfig, connect},
        store::EventStore,
    };
    use eventboard_common::model::{
        Id,
        event::{EventFields, Location},
    };
    use serde_json::Number;

    fn test_config() -> MongoConfig {
        MongoConfig {
            url: std::env::var("MONGODB_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_owned()),
            database: "eventboard_test".to_owned(),
            app_name: None,
            max_pool_size: 4,
            connect_timeout_secs: 5,
        }
    }

    #[tokio::test]
    #[ignore = "requires a running MongoDB"]
    async fn event_lifecycle() {
        let database = connect(&test_config()).await.unwrap();
        let client = DbClient::new(&database);

        let owner = Id::generate();
        let mut fields = EventFields {
            event_name: "Cleanup".to_owned(),
            event_description: "Park cleanup".to_owned(),
            location: Location {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                state: "IL".to_owned(),
                zip_code: Number::from(62701),
            },
        };

        let created = client.create_event(owner, &fields).await.unwrap();
        assert_eq!(client.fetch_event(created.id).await.unwrap(), Some(created.clone()));
        assert!(client.fetch_event_posts(created.id).await.unwrap().is_empty());

        fields.event_name = "Beach cleanup".to_owned();
        let updated = client.update_event(created.id, &fields).await.unwrap().unwrap();
        assert_eq!(updated.fields, fields);
        assert_eq!(updated.owner, owner);

        let deleted = client.delete_event(created.id).await.unwrap();
        assert_eq!(deleted, Some(updated));
        assert_eq!(client.fetch_event(created.id).await.unwrap(), None);
        assert_eq!(client.delete_event(created.id).await.unwrap(), None);
    }
}
