//! Bearer tokens and the sessions they resolve to.
//!
//! Tokens are issued by the login service. Here they are only parsed, hashed
//! and looked up.

use crate::{
    model::{Id, InvalidIdError, user::UserMarker},
    util::SessionLifetime,
};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const AUTH_TOKEN_SECRET_LEN: usize = 24;
pub const AUTH_TOKEN_SALT_LEN: usize = 18;
pub const AUTH_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Could not hash auth token: {0}")]
pub struct AuthTokenHashError(argon2::Error);

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum TokenPart {
    Secret,
    Salt,
}

impl Display for TokenPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPart::Secret => f.write_str("secret"),
            TokenPart::Salt => f.write_str("salt"),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AuthTokenDecodeError {
    #[error("Expected a token of the form <user id>:<secret>:<salt>")]
    Malformed,
    #[error("The token names an invalid user: {0}")]
    InvalidUserId(#[from] InvalidIdError),
    #[error("The {part} is not valid base64: {source}")]
    Base64 { part: TokenPart, source: DecodeError },
    #[error("The {part} is {actual} bytes long, expected {expected}")]
    Length {
        part: TokenPart,
        expected: usize,
        actual: usize,
    },
}

/// `<user id>:<secret>:<salt>`, both byte parts in unpadded url-safe base64.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthToken {
    pub user_id: Id<UserMarker>,
    pub secret: [u8; AUTH_TOKEN_SECRET_LEN],
    pub salt: [u8; AUTH_TOKEN_SALT_LEN],
}

/// What the sessions collection stores instead of the token itself.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthTokenHash([u8; AUTH_TOKEN_HASH_LEN]);

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Authentication {
    pub user: Id<UserMarker>,
    pub token_hash: AuthTokenHash,
    pub created_at: UtcDateTime,
    /// `None` never expires.
    pub expires_after: Option<SessionLifetime>,
}

impl AuthToken {
    #[must_use]
    pub fn generate_random(user_id: Id<UserMarker>) -> Self {
        Self {
            user_id,
            secret: rand::random(),
            salt: rand::random(),
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        format!(
            "{}:{}:{}",
            self.user_id,
            BASE64_URL_SAFE_NO_PAD.encode(self.secret),
            BASE64_URL_SAFE_NO_PAD.encode(self.salt),
        )
    }

    pub fn hash(&self) -> Result<AuthTokenHash, AuthTokenHashError> {
        let mut hash = [0; AUTH_TOKEN_HASH_LEN];
        Argon2::default()
            .hash_password_into(&self.secret, &self.salt, &mut hash)
            .map_err(AuthTokenHashError)?;

        Ok(AuthTokenHash(hash))
    }
}

impl FromStr for AuthToken {
    type Err = AuthTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user_id, rest) = s.split_once(':').ok_or(AuthTokenDecodeError::Malformed)?;
        let (secret, salt) = rest
            .split_once(':')
            .ok_or(AuthTokenDecodeError::Malformed)?;

        Ok(Self {
            user_id: Id::parse(user_id)?,
            secret: decode_part(TokenPart::Secret, secret)?,
            salt: decode_part(TokenPart::Salt, salt)?,
        })
    }
}

fn decode_part<const N: usize>(
    part: TokenPart,
    encoded: &str,
) -> Result<[u8; N], AuthTokenDecodeError> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|source| AuthTokenDecodeError::Base64 { part, source })?;
    let actual = bytes.len();

    bytes
        .try_into()
        .map_err(|_| AuthTokenDecodeError::Length {
            part,
            expected: N,
            actual,
        })
}

impl AuthTokenHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Authentication {
    /// `None` when the session never expires, which includes lifetimes reaching
    /// past the last representable date.
    #[must_use]
    pub fn expires_at(&self) -> Option<UtcDateTime> {
        self.expires_after
            .and_then(|expires_after| self.created_at.checked_add(expires_after.get()))
    }

    #[must_use]
    pub fn is_expired_at(&self, now: UtcDateTime) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at < now)
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl Debug for AuthTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthTokenHash(..)")
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("A stored token hash was {0} bytes long")]
pub struct InvalidAuthTokenHashError(usize);

impl TryFrom<&[u8]> for AuthTokenHash {
    type Error = InvalidAuthTokenHashError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        value
            .try_into()
            .map(Self)
            .map_err(|_| InvalidAuthTokenHashError(value.len()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            auth::{AuthToken, AuthTokenDecodeError, AuthTokenHash, Authentication, TokenPart},
        },
        util::SessionLifetime,
    };
    use time::{Duration, macros::utc_datetime};

    #[test]
    fn token_str_parses_back() {
        let token = AuthToken::generate_random(Id::generate());
        let token_str = token.as_token_str();
        assert!(!token_str.contains(['+', '/', '=']));

        let parsed: AuthToken = token_str.parse().unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.hash().unwrap(), token.hash().unwrap());
    }

    #[test]
    fn token_str_errors() {
        assert_eq!(
            "65a1f0c2e4b0a1b2c3d4e5f6".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::Malformed)
        );
        assert!(matches!(
            "12345:AAAA:AAAA".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::InvalidUserId(_))
        ));
        assert!(matches!(
            "65a1f0c2e4b0a1b2c3d4e5f6:!!!!:AAAA".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::Base64 {
                part: TokenPart::Secret,
                ..
            })
        ));
        assert_eq!(
            "65a1f0c2e4b0a1b2c3d4e5f6:AAAA:AAAA".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::Length {
                part: TokenPart::Secret,
                expected: 24,
                actual: 3,
            })
        );
    }

    #[test]
    fn different_tokens_hash_differently() {
        let user_id = Id::generate();
        let first = AuthToken::generate_random(user_id).hash().unwrap();
        let second = AuthToken::generate_random(user_id).hash().unwrap();

        assert_ne!(first, second);
        assert_eq!(AuthTokenHash::try_from(first.as_bytes()), Ok(first));
        assert!(AuthTokenHash::try_from([0; 3].as_slice()).is_err());
    }

    #[test]
    fn expiry() {
        let token = AuthToken::generate_random(Id::generate());
        let created_at = utc_datetime!(2026-01-01 00:00);
        let mut authentication = Authentication {
            user: token.user_id,
            token_hash: token.hash().unwrap(),
            created_at,
            expires_after: None,
        };

        assert_eq!(authentication.expires_at(), None);
        assert!(!authentication.is_expired_at(created_at + Duration::days(3650)));

        authentication.expires_after = Some(SessionLifetime::from_seconds(3600).unwrap());
        assert_eq!(
            authentication.expires_at(),
            Some(utc_datetime!(2026-01-01 01:00))
        );
        assert!(!authentication.is_expired_at(created_at + Duration::minutes(59)));
        assert!(authentication.is_expired_at(created_at + Duration::minutes(61)));
    }

    #[test]
    fn lifetime_past_the_last_date_never_expires() {
        let token = AuthToken::generate_random(Id::generate());
        let created_at = utc_datetime!(2026-01-01 00:00);
        let authentication = Authentication {
            user: token.user_id,
            token_hash: token.hash().unwrap(),
            created_at,
            expires_after: Some(SessionLifetime::from_seconds(i64::MAX / 2).unwrap()),
        };

        assert_eq!(authentication.expires_at(), None);
        assert!(!authentication.is_expired_at(created_at + Duration::days(3650)));
    }
}
