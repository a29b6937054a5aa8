use crate::store::DbError;
use eventboard_common::{
    model::{
        Id, ModelValidationError,
        auth::{AuthTokenHash, Authentication},
        event::{Event, EventFields, Location},
        post::Post,
        user::{User, UserMarker, Username},
    },
    util::SessionLifetime,
};
use mongodb::bson::{Binary, DateTime, Document, oid::ObjectId};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number};
use time::UtcDateTime;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub event_name: String,
    pub event_description: String,
    pub location: LocationRecord,
}

/// BSON has no unsigned 64-bit integer, so zip codes past `i64::MAX` are kept as doubles.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocationRecord {
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(serialize_with = "serialize_zip_code")]
    pub zip_code: Number,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub(crate) struct UserRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRecord {
    pub user: ObjectId,
    pub token_hash: Binary,
    pub created_at: DateTime,
    pub expires_after_seconds: Option<i64>,
}

impl EventRecord {
    pub fn new(owner: Id<UserMarker>, fields: &EventFields) -> Self {
        Self {
            id: ObjectId::new(),
            user: owner.object_id(),
            event_name: fields.event_name.clone(),
            event_description: fields.event_description.clone(),
            location: LocationRecord::from(fields.location.clone()),
        }
    }
}

impl From<Location> for LocationRecord {
    fn from(value: Location) -> Self {
        Self {
            address: value.address,
            city: value.city,
            state: value.state,
            zip_code: value.zip_code,
        }
    }
}

impl From<LocationRecord> for Location {
    fn from(value: LocationRecord) -> Self {
        Self {
            address: value.address,
            city: value.city,
            state: value.state,
            zip_code: value.zip_code,
        }
    }
}

fn serialize_zip_code<S>(zip_code: &Number, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match (zip_code.as_i64(), zip_code.as_f64()) {
        (Some(int), _) => serializer.serialize_i64(int),
        (None, Some(float)) => serializer.serialize_f64(float),
        (None, None) => zip_code.serialize(serializer),
    }
}

impl From<EventRecord> for Event {
    fn from(value: EventRecord) -> Self {
        Self {
            id: value.id.into(),
            owner: value.user.into(),
            fields: EventFields {
                event_name: value.event_name,
                event_description: value.event_description,
                location: value.location.into(),
            },
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            username: Username::new(value.username)?,
        })
    }
}

impl TryFrom<SessionRecord> for Authentication {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        let created_at_nanos = i128::from(value.created_at.timestamp_millis()) * 1_000_000;

        Ok(Self {
            user: value.user.into(),
            token_hash: AuthTokenHash::try_from(value.token_hash.bytes.as_slice())?,
            created_at: UtcDateTime::from_unix_timestamp_nanos(created_at_nanos)?,
            expires_after: value
                .expires_after_seconds
                .map(SessionLifetime::from_seconds)
                .transpose()?,
        })
    }
}

/// Posts are only read here, so everything besides the two ids is carried
/// over as relaxed extended JSON.
pub(crate) fn post_from_document(mut document: Document) -> Result<Post, DbError> {
    let id = document.get_object_id("_id")?;
    let external_id = document.get_object_id("externalId")?;
    document.remove("_id");
    document.remove("externalId");

    let content: Map<_, _> = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    Ok(Post {
        id: id.into(),
        external_id: external_id.into(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use crate::record::{EventRecord, LocationRecord, SessionRecord, post_from_document};
    use eventboard_common::model::{
        Id,
        auth::Authentication,
        event::{Event, EventFields, Location},
    };
    use mongodb::bson::{Binary, Bson, DateTime, doc, oid::ObjectId, spec::BinarySubtype};
    use serde_json::{Number, json};

    #[test]
    fn event_record_keeps_fields() {
        let owner = Id::generate();
        let fields = EventFields {
            event_name: "Cleanup".to_owned(),
            event_description: "Park cleanup".to_owned(),
            location: Location {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                state: "IL".to_owned(),
                zip_code: Number::from(62701),
            },
        };

        let record = EventRecord::new(owner, &fields);
        let document = mongodb::bson::to_document(&record).unwrap();
        assert_eq!(document.get_object_id("user").unwrap(), owner.object_id());
        assert_eq!(
            document.get_document("location").unwrap().get_i64("zipCode").unwrap(),
            62701
        );

        let event = Event::from(record.clone());
        assert_eq!(event.id.object_id(), record.id);
        assert_eq!(event.owner, owner);
        assert_eq!(event.fields, fields);
    }

    #[test]
    fn zip_code_outside_i64_is_stored_as_double() {
        let location = |zip_code: Number| Location {
            address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            zip_code,
        };
        let zip_code_of = |location: Location| {
            mongodb::bson::to_document(&LocationRecord::from(location))
                .unwrap()
                .get("zipCode")
                .cloned()
                .unwrap()
        };

        assert!(matches!(
            zip_code_of(location(Number::from(u64::MAX))),
            Bson::Double(_)
        ));
        assert_eq!(zip_code_of(location(Number::from(-5))), Bson::Int64(-5));
        assert_eq!(
            zip_code_of(location(Number::from_f64(627.5).unwrap())),
            Bson::Double(627.5)
        );
    }

    #[test]
    fn post_document_passes_content_through() {
        let id = ObjectId::new();
        let external_id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "externalId": external_id,
            "title": "Great turnout",
            "likes": 3,
        };

        let post = post_from_document(document).unwrap();
        assert_eq!(post.id.object_id(), id);
        assert_eq!(post.external_id.object_id(), external_id);
        assert_eq!(post.content.get("title"), Some(&json!("Great turnout")));
        assert_eq!(post.content.get("likes"), Some(&json!(3)));
        assert!(!post.content.contains_key("_id"));
    }

    #[test]
    fn post_document_without_event_is_rejected() {
        assert!(post_from_document(doc! { "_id": ObjectId::new() }).is_err());
    }

    #[test]
    fn session_record() {
        let record = SessionRecord {
            user: ObjectId::new(),
            token_hash: Binary {
                subtype: BinarySubtype::Generic,
                bytes: vec![7; 32],
            },
            created_at: DateTime::from_millis(1_767_225_600_000),
            expires_after_seconds: Some(3600),
        };

        let authentication = Authentication::try_from(record.clone()).unwrap();
        assert_eq!(authentication.user.object_id(), record.user);
        assert_eq!(authentication.created_at.unix_timestamp(), 1_767_225_600);
        assert_eq!(
            authentication.expires_after.map(|duration| duration.whole_seconds()),
            Some(3600)
        );

        let short_hash = SessionRecord {
            token_hash: Binary {
                subtype: BinarySubtype::Generic,
                bytes: vec![7; 3],
            },
            ..record
        };
        assert!(Authentication::try_from(short_hash).is_err());
    }
}
