use crate::model::Id;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user as far as events care: only ever read, to resolve callers and owners.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id<UserMarker>,
    pub username: Username,
}

/// Event ownership is decided by comparing these, so a blank one is never valid.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Blank username: {0:?}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        if username.trim().is_empty() {
            Err(InvalidUsernameError(username))
        } else {
            Ok(Self(username))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = InvalidUsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::Username;
    use serde_json::json;

    #[test]
    fn blank_usernames_are_rejected() {
        assert_eq!(Username::new("ada".to_owned()).unwrap().as_str(), "ada");
        assert!(Username::new(String::new()).is_err());
        assert!(Username::new(" \t".to_owned()).is_err());
    }

    #[test]
    fn serde_checks_username() {
        let username: Username = serde_json::from_value(json!("ada")).unwrap();
        assert_eq!(serde_json::to_value(&username).unwrap(), json!("ada"));
        assert!(serde_json::from_value::<Username>(json!("")).is_err());
    }
}
