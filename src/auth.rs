//! Identity of the requesting user.
//!
//! Authentication itself happens in the identity-aware proxy that fronts this
//! server; the proxy verifies the client and forwards the stable user id in
//! the [USER_ID_HEADER] header. This module turns that header into a
//! validated [UserId] and rejects requests that arrive without one, so no
//! storage operation can ever run against an empty namespace.

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::Error;

/// The request header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-auth-user";

/// A validated user id under which all of a user's data is namespaced.
///
/// User ids become storage path segments, so the constructor rejects values
/// that could escape their segment or collide with the store's reserved
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a user id.
    ///
    /// # Errors
    /// Returns [Error::Unauthenticated] if `id` is empty or contains a
    /// character that cannot appear in a storage path segment.
    pub fn new(id: &str) -> Result<Self, Error> {
        let forbidden =
            |c: char| matches!(c, '/' | '.' | '$' | '#' | '[' | ']') || c.is_control() || c.is_whitespace();

        if id.is_empty() || id.chars().any(forbidden) {
            return Err(Error::Unauthenticated);
        }

        Ok(Self(id.to_owned()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extractor for the authenticated user's id.
///
/// Handlers that take an `Identity` argument respond with 401 when the
/// identity header is missing or unusable.
#[derive(Debug, Clone)]
pub struct Identity(pub UserId);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(Error::Unauthenticated)?;
        let id = header.to_str().map_err(|_| Error::Unauthenticated)?;

        UserId::new(id).map(Identity)
    }
}
