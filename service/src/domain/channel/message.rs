//! [`Message`] definitions.

use std::{str::FromStr, sync::LazyLock};

use common::{
    unit,
    validate::{self, Constraint},
    DateTimeOf,
};
use derive_more::{AsRef, Display, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, User};

#[cfg(doc)]
use super::Channel;

/// Message posted into a [`Channel`].
#[derive(Clone, Debug)]
pub struct Message {
    /// Unique ID, absent until assigned by the persistence layer.
    id: Option<Id>,

    /// ID of the [`Channel`] this [`Message`] belongs to.
    channel: super::Id,

    /// [`User`] who authored this [`Message`].
    author: User,

    /// [`DateTime`] when this [`Message`] was posted.
    ///
    /// [`DateTime`]: common::DateTime
    date: CreationDateTime,

    /// [`Text`] of this [`Message`].
    text: Text,
}

/// Plain descriptor a [`Message`] is populated from.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique ID, if already persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// ID of the channel the message belongs to.
    pub channel: String,

    /// ID of the authoring user.
    pub author: String,

    /// Posting date, in RFC 3339 form.
    pub date: String,

    /// Message text.
    pub text: String,
}

impl Message {
    /// Constructs a new [`Message`] by populating it from the provided
    /// [`Descriptor`] and the resolved `author`.
    ///
    /// # Errors
    ///
    /// Errors if any field of the [`Descriptor`] violates its declared
    /// constraint, or if the resolved `author`'s ID does not match the
    /// descriptor's reference.
    pub fn new(desc: Descriptor, author: User) -> Result<Self, validate::Error> {
        let id = desc
            .id
            .map(|id| validate::field("id", Constraint::Format, id, Id::new))
            .transpose()?;
        let channel = validate::field(
            "channel",
            Constraint::Format,
            desc.channel,
            super::Id::new,
        )?;

        let author_id =
            validate::field("author", Constraint::Format, desc.author, |raw| {
                user::Id::new(raw)
            })?;
        if author.id() != Some(&author_id) {
            return Err(validate::Error::violation(
                "author",
                Constraint::Allowed,
            ));
        }

        let date = validate::field("date", Constraint::Format, desc.date, |raw| {
            CreationDateTime::from_rfc3339(&raw).ok()
        })?;
        let text =
            validate::field("text", Constraint::Length, desc.text, Text::new)?;

        Ok(Self {
            id,
            channel,
            author,
            date,
            text,
        })
    }

    /// Returns the unique ID of this [`Message`], if assigned already.
    #[must_use]
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Assigns the unique ID of this [`Message`].
    ///
    /// # Errors
    ///
    /// Errors if an ID has been assigned already: the ID is immutable once
    /// set.
    pub fn assign_id(&mut self, id: Id) -> Result<(), validate::Error> {
        if self.id.is_some() {
            return Err(validate::Error::violation("id", Constraint::Immutable));
        }
        self.id = Some(id);
        Ok(())
    }

    /// Returns the ID of the [`Channel`] this [`Message`] belongs to.
    #[must_use]
    pub fn channel(&self) -> &super::Id {
        &self.channel
    }

    /// Returns the [`User`] who authored this [`Message`].
    #[must_use]
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Returns the [`DateTime`] when this [`Message`] was posted.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn date(&self) -> CreationDateTime {
        self.date
    }

    /// Returns the [`Text`] of this [`Message`].
    #[must_use]
    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Translates this [`Message`] into its persistable [`Descriptor`].
    ///
    /// # Panics
    ///
    /// Panics if the resolved author has no assigned ID, which cannot
    /// happen for an author read back from the persistence layer.
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            id: self.id.as_ref().map(ToString::to_string),
            channel: self.channel.to_string(),
            author: self
                .author
                .id()
                .expect("persisted author has an ID")
                .to_string(),
            date: self.date.to_rfc3339(),
            text: self.text.to_string(),
        }
    }
}

/// ID of a [`Message`].
#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Creates a new random [`Id`].
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Id`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9]{1,40}$").expect("valid regex")
        });

        REGEX.is_match(id.as_ref())
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Id`")
    }
}

/// Text of a [`Message`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (1..=1000)
            .contains(&text.chars().count())
            .then_some(Self(text))
    }
}

/// [`DateTime`] when a [`Message`] was posted.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Message, unit::Creation)>;
