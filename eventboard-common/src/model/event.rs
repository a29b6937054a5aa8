use crate::model::{Id, user::UserMarker};
use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct EventMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Id<EventMarker>,
    /// The creating user. Never changes after creation.
    #[serde(rename = "user")]
    pub owner: Id<UserMarker>,
    #[serde(flatten)]
    pub fields: EventFields,
}

/// The caller-provided part of an event, replaced as a whole on update.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    pub event_name: String,
    pub event_description: String,
    pub location: Location,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: Number,
}
