//! [`Session`] definitions.

use std::{collections::HashMap, str::FromStr, time::Duration};

use common::{unit, DateTime, DateTimeOf};
use derive_more::{AsRef, Display, Into};
use serde_json::Value;

use crate::domain::User;

use super::RightsSet;

/// Server-side record of one authenticated client connection.
///
/// A [`Session`] binds an opaque [`Token`] to a [`RightsSet`] and an
/// arbitrary [`Data`] payload. Its `last_access_date` slides forward on
/// every successful lookup, which is the sole mechanism extending its life
/// past the idle timeout.
#[derive(Clone, Debug)]
pub struct Session {
    /// Opaque unique [`Token`] of this [`Session`].
    token: Token,

    /// [`DateTime`] when this [`Session`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    creation_date: CreationDateTime,

    /// [`DateTime`] of the last successful lookup of this [`Session`].
    ///
    /// [`DateTime`]: common::DateTime
    last_access_date: LastAccessDateTime,

    /// [`Right`]s granted to this [`Session`].
    ///
    /// [`Right`]: super::Right
    rights: RightsSet,

    /// Free-form payload of this [`Session`].
    data: Data,
}

impl Session {
    /// Creates a new [`Session`] with the provided [`Token`].
    ///
    /// Both dates are initialized to the current instant, so the
    /// `last_access_date >= creation_date` invariant holds from the start.
    #[must_use]
    pub(super) fn new(token: Token) -> Self {
        let now = DateTime::now();
        Self {
            token,
            creation_date: now.coerce(),
            last_access_date: now.coerce(),
            rights: RightsSet::new(),
            data: Data::default(),
        }
    }

    /// Returns the [`Token`] of this [`Session`].
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the [`DateTime`] when this [`Session`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn creation_date(&self) -> CreationDateTime {
        self.creation_date
    }

    /// Returns the [`DateTime`] of the last successful lookup of this
    /// [`Session`].
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn last_access_date(&self) -> LastAccessDateTime {
        self.last_access_date
    }

    /// Slides the `last_access_date` of this [`Session`] to the current
    /// instant.
    pub(super) fn touch(&mut self) {
        self.last_access_date = DateTime::now().coerce();
    }

    /// Indicates whether this [`Session`] has been idle longer than the
    /// provided timeout.
    #[must_use]
    pub fn is_idle(&self, expire_after: Duration) -> bool {
        DateTime::now().coerce() - self.last_access_date > expire_after
    }

    /// Returns the [`RightsSet`] granted to this [`Session`].
    #[must_use]
    pub fn rights(&self) -> &RightsSet {
        &self.rights
    }

    /// Returns the mutable [`RightsSet`] granted to this [`Session`].
    pub fn rights_mut(&mut self) -> &mut RightsSet {
        &mut self.rights
    }

    /// Returns the [`Data`] payload of this [`Session`].
    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Returns the mutable [`Data`] payload of this [`Session`].
    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    /// Returns the authenticated [`User`] of this [`Session`], if any.
    ///
    /// Shortcut for the canonical [`Data`] slot.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.data.user.as_ref()
    }
}

/// Free-form payload of a [`Session`].
///
/// The authenticated [`User`] occupies the canonical typed slot; anything
/// else a request handler wants to remember goes into `values`.
#[derive(Clone, Debug, Default)]
pub struct Data {
    /// Authenticated principal of the [`Session`].
    pub user: Option<User>,

    /// Remaining free-form values, keyed by name.
    pub values: HashMap<String, Value>,
}

/// Opaque access token of a [`Session`]: an even-length string of lowercase
/// hex characters rendered from random bytes.
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Into, PartialEq,
)]
#[as_ref(str, String)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] if the given `token` is well-formed.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        Self::check(&token).then_some(Self(token))
    }

    /// Renders a new [`Token`] out of the provided random bytes.
    #[must_use]
    pub(super) fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Checks whether the given `token` is a well-formed [`Token`].
    ///
    /// Well-formedness does not imply the token resolves to a live
    /// [`Session`].
    fn check(token: impl AsRef<str>) -> bool {
        let token = token.as_ref();
        !token.is_empty()
            && token.len() % 2 == 0
            && token
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

impl FromStr for Token {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Token`")
    }
}

/// [`DateTime`] when a [`Session`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Session, unit::Creation)>;

/// [`DateTime`] of the last successful lookup of a [`Session`].
///
/// [`DateTime`]: common::DateTime
pub type LastAccessDateTime = DateTimeOf<(Session, unit::LastAccess)>;

#[cfg(test)]
mod spec {
    use super::Token;

    #[test]
    fn token_format() {
        assert!(Token::new("25fde3b96a").is_some());
        assert!(Token::new("").is_none());
        assert!(Token::new("25fde3b96").is_none());
        assert!(Token::new("25FDE3B96A").is_none());
        assert!(Token::new("not-a-token").is_none());
    }
}
