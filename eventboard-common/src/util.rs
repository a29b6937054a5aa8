use thiserror::Error;
use time::Duration;

/// How long a session stays valid after it was created.
///
/// Stored as whole seconds and never zero or negative.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct SessionLifetime(Duration);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
#[error("A session lifetime must be a positive number of seconds, got {0}")]
pub struct InvalidLifetimeError(i64);

impl SessionLifetime {
    pub fn from_seconds(seconds: i64) -> Result<Self, InvalidLifetimeError> {
        if seconds > 0 {
            Ok(Self(Duration::seconds(seconds)))
        } else {
            Err(InvalidLifetimeError(seconds))
        }
    }

    #[must_use]
    pub fn get(self) -> Duration {
        self.0
    }

    #[must_use]
    pub fn whole_seconds(self) -> i64 {
        self.0.whole_seconds()
    }
}
