//! [`Article`] definitions.

use std::{str::FromStr, sync::LazyLock};

use common::{
    association::Set,
    unit,
    validate::{self, Constraint},
    DateTimeOf,
};
use derive_more::{AsRef, Display, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{user, User};

/// News article published by a community member.
#[derive(Clone, Debug)]
pub struct Article {
    /// Unique ID, absent until assigned by the persistence layer.
    id: Option<Id>,

    /// [`User`] who authored this [`Article`].
    author: User,

    /// [`DateTime`] when this [`Article`] was published.
    ///
    /// [`DateTime`]: common::DateTime
    date: CreationDateTime,

    /// [`Title`] of this [`Article`].
    title: Title,

    /// [`Text`] of this [`Article`].
    text: Text,

    /// [`Tag`]s attached to this [`Article`].
    tags: Set<Tag>,
}

/// Plain descriptor an [`Article`] is populated from.
///
/// Reference fields carry IDs; the referenced [`User`] is resolved by the
/// persistence layer and passed to [`Article::new()`] separately.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique ID, if already persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// ID of the authoring user.
    pub author: String,

    /// Publication date, in RFC 3339 form.
    pub date: String,

    /// Title.
    pub title: String,

    /// Body text.
    pub text: String,

    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    /// Constructs a new [`Article`] by populating it from the provided
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
        let title =
            validate::field("title", Constraint::Length, desc.title, Title::new)?;
        let text =
            validate::field("text", Constraint::Length, desc.text, Text::new)?;

        let mut tags = Set::new();
        for raw in desc.tags {
            let tag = validate::field("tags", Constraint::Length, raw, Tag::new)?;
            _ = tags.add(tag);
        }
        _ = tags.take_changes();

        Ok(Self {
            id,
            author,
            date,
            title,
            text,
            tags,
        })
    }

    /// Returns the unique ID of this [`Article`], if assigned already.
    #[must_use]
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Assigns the unique ID of this [`Article`].
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

    /// Returns the [`User`] who authored this [`Article`].
    #[must_use]
    pub fn author(&self) -> &User {
        &self.author
    }

    /// Returns the [`DateTime`] when this [`Article`] was published.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn date(&self) -> CreationDateTime {
        self.date
    }

    /// Returns the [`Title`] of this [`Article`].
    #[must_use]
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Sets the [`Title`] of this [`Article`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_title(
        &mut self,
        title: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.title =
            validate::field("title", Constraint::Length, title.into(), Title::new)?;
        Ok(())
    }

    /// Returns the [`Text`] of this [`Article`].
    #[must_use]
    pub fn text(&self) -> &Text {
        &self.text
    }

    /// Sets the [`Text`] of this [`Article`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_text(
        &mut self,
        text: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.text =
            validate::field("text", Constraint::Length, text.into(), Text::new)?;
        Ok(())
    }

    /// Returns the [`Tag`]s attached to this [`Article`].
    #[must_use]
    pub fn tags(&self) -> &Set<Tag> {
        &self.tags
    }

    /// Indicates whether this [`Article`] carries the provided [`Tag`].
    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.has(tag)
    }

    /// Attaches the provided tag to this [`Article`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is not a valid [`Tag`].
    pub fn add_tag(
        &mut self,
        tag: impl Into<String>,
    ) -> Result<(), validate::Error> {
        let tag = validate::field("tags", Constraint::Length, tag.into(), Tag::new)?;
        _ = self.tags.add(tag);
        Ok(())
    }

    /// Detaches the provided [`Tag`] from this [`Article`].
    pub fn remove_tag(&mut self, tag: &Tag) {
        _ = self.tags.remove(tag);
    }

    /// Replaces the [`Tag`]s of this [`Article`] with the provided list.
    ///
    /// # Errors
    ///
    /// Errors if any of the provided values is not a valid [`Tag`].
    /// Nothing is replaced in that case.
    pub fn set_tags(
        &mut self,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), validate::Error> {
        let mut replacement = Set::new();
        for raw in tags {
            let tag =
                validate::field("tags", Constraint::Length, raw.into(), Tag::new)?;
            _ = replacement.add(tag);
        }
        self.tags = replacement;
        Ok(())
    }

    /// Translates this [`Article`] into its persistable [`Descriptor`].
    ///
    /// # Panics
    ///
    /// Panics if the resolved author has no assigned ID, which cannot
    /// happen for an author read back from the persistence layer.
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            id: self.id.as_ref().map(ToString::to_string),
            author: self
                .author
                .id()
                .expect("persisted author has an ID")
                .to_string(),
            date: self.date.to_rfc3339(),
            title: self.title.to_string(),
            text: self.text.to_string(),
            tags: self.tags.iter().map(ToString::to_string).collect(),
        }
    }
}

/// ID of an [`Article`].
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
            Regex::new(r"^[a-z0-9.]{1,40}$").expect("valid regex")
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

/// Title of an [`Article`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        (1..=100)
            .contains(&title.chars().count())
            .then_some(Self(title))
    }
}

/// Body text of an [`Article`].
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

/// Tag attached to an [`Article`] or a [`Channel`].
///
/// [`Channel`]: super::Channel
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Tag(String);

impl Tag {
    /// Creates a new [`Tag`] if the given `tag` is valid.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        (1..=40).contains(&tag.chars().count()).then_some(Self(tag))
    }
}

impl FromStr for Tag {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Tag`")
    }
}

/// [`DateTime`] when an [`Article`] was published.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Article, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{validate::Constraint, DateTime};

    use crate::domain::user;

    use super::{Article, Descriptor, Tag};

    fn author() -> user::User {
        user::User::new(user::Descriptor {
            id: Some("f8a41c551a".to_owned()),
            email: "john.doe@domain.com".to_owned(),
            password: user::User::hash_password(
                &user::Password::new("Admin1234").unwrap(),
            )
            .to_string(),
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            rights: vec![],
        })
        .unwrap()
    }

    fn descriptor() -> Descriptor {
        Descriptor {
            id: None,
            author: "f8a41c551a".to_owned(),
            date: DateTime::now().to_rfc3339(),
            title: "Garden renovation".to_owned(),
            text: "Here is some text ;)".to_owned(),
            tags: vec!["council.report".to_owned(), "garden".to_owned()],
        }
    }

    #[test]
    fn populates_from_descriptor() {
        let article = Article::new(descriptor(), author()).unwrap();

        assert!(article.id().is_none());
        assert_eq!(article.title().to_string(), "Garden renovation");
        assert!(article.has_tag(&Tag::new("garden").unwrap()));
        assert_eq!(article.tags().len(), 2);
    }

    #[test]
    fn rejects_missing_title() {
        let mut desc = descriptor();
        desc.title = String::new();

        let err = Article::new(desc, author()).unwrap_err();
        assert_eq!(err.violations[0].field, "title");
        assert_eq!(err.violations[0].constraint, Constraint::Length);
    }

    #[test]
    fn rejects_author_mismatch() {
        let mut desc = descriptor();
        desc.author = "7eadb12963".to_owned();

        let err = Article::new(desc, author()).unwrap_err();
        assert_eq!(err.violations[0].field, "author");
    }

    #[test]
    fn tags_deduplicate() {
        let mut article = Article::new(descriptor(), author()).unwrap();
        article.add_tag("garden").unwrap();

        assert_eq!(article.tags().len(), 2);
        article.remove_tag(&Tag::new("garden").unwrap());
        assert_eq!(article.tags().len(), 1);
    }
}
