pub mod auth;
pub mod event;
pub mod post;
pub mod user;

use crate::{
    model::{auth::InvalidAuthTokenHashError, user::InvalidUsernameError},
    util::InvalidLifetimeError,
};
use bson::oid::ObjectId;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error as _, Unexpected},
};
use std::{fmt::Display, marker::PhantomData, str::FromStr};
use thiserror::Error;
use time::error::ComponentRange;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    Lifetime(#[from] InvalidLifetimeError),
    #[error(transparent)]
    TokenHash(#[from] InvalidAuthTokenHashError),
    #[error("Timestamp out of range: {0}")]
    Timestamp(#[from] ComponentRange),
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Not a well-formed object id: {0:?}")]
pub struct InvalidIdError(String);

/// A document identifier tagged with the kind of document it points to.
///
/// Over JSON this is the 24 character lowercase hex form of the object id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Id<Marker>(ObjectId, PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(object_id: ObjectId) -> Self {
        Self(object_id, PhantomData)
    }

    #[must_use]
    pub fn generate() -> Self {
        Self::new(ObjectId::new())
    }

    #[must_use]
    pub fn object_id(self) -> ObjectId {
        self.0
    }

    /// Parses an id, accepting only strings that re-encode to themselves.
    ///
    /// Uppercase hex parses as an object id but does not round-trip, so it is rejected.
    pub fn parse(id: &str) -> Result<Self, InvalidIdError> {
        ObjectId::parse_str(id)
            .ok()
            .filter(|object_id| object_id.to_hex() == id)
            .map(Self::new)
            .ok_or_else(|| InvalidIdError(id.to_owned()))
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<Marker> From<ObjectId> for Id<Marker> {
    fn from(value: ObjectId) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for ObjectId {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}

impl<Marker> Serialize for Id<Marker> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de, Marker> Deserialize<'de> for Id<Marker> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Self::parse(&inner)
            .map_err(|_| D::Error::invalid_value(Unexpected::Str(&inner), &"a 24 digit hex id"))
    }
}
