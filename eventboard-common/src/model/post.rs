use crate::model::{Id, event::EventMarker};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Id<PostMarker>,
    pub external_id: Id<EventMarker>,
    /// Everything else stored on the post, passed through as-is.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}
