//! [`Channel`] definitions.

pub mod message;

use std::{str::FromStr, sync::LazyLock};

use common::{
    association::{Map, Set},
    unit,
    validate::{self, Constraint},
    DateTimeOf,
};
use derive_more::{AsRef, Display, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{article::Tag, user, User};

pub use self::message::Message;

/// Discussion channel between community members.
///
/// The owner and the member map gate who may read and post messages (see
/// the member-or-right authorization filter).
#[derive(Clone, Debug)]
pub struct Channel {
    /// Unique ID, absent until assigned by the persistence layer.
    id: Option<Id>,

    /// [`User`] owning this [`Channel`].
    owner: User,

    /// [`DateTime`] when this [`Channel`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    date: CreationDateTime,

    /// [`Title`] of this [`Channel`].
    title: Title,

    /// [`Summary`] of this [`Channel`].
    summary: Summary,

    /// [`Tag`]s attached to this [`Channel`].
    tags: Set<Tag>,

    /// Members of this [`Channel`], keyed by their [`user::Id`].
    members: Map<user::Id, User>,
}

/// Plain descriptor a [`Channel`] is populated from.
///
/// Reference fields carry IDs; the referenced [`User`]s are resolved by the
/// persistence layer and passed to [`Channel::new()`] separately.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique ID, if already persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// ID of the owning user.
    pub owner: String,

    /// Creation date, in RFC 3339 form.
    pub date: String,

    /// Title.
    pub title: String,

    /// Summary.
    pub summary: String,

    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// IDs of the member users.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Channel {
    /// Constructs a new [`Channel`] by populating it from the provided
    /// [`Descriptor`] and the resolved `owner` and `members`.
    ///
    /// Members are keyed by their ID, so providing the same [`User`] twice
    /// yields a single membership.
    ///
    /// # Errors
    ///
    /// Errors if any field of the [`Descriptor`] violates its declared
    /// constraint, if the resolved `owner`'s ID does not match the
    /// descriptor's reference, or if a resolved member has no assigned ID.
    pub fn new(
        desc: Descriptor,
        owner: User,
        members: Vec<User>,
    ) -> Result<Self, validate::Error> {
        let id = desc
            .id
            .map(|id| validate::field("id", Constraint::Format, id, Id::new))
            .transpose()?;

        let owner_id =
            validate::field("owner", Constraint::Format, desc.owner, |raw| {
                user::Id::new(raw)
            })?;
        if owner.id() != Some(&owner_id) {
            return Err(validate::Error::violation("owner", Constraint::Allowed));
        }

        let date = validate::field("date", Constraint::Format, desc.date, |raw| {
            CreationDateTime::from_rfc3339(&raw).ok()
        })?;
        let title =
            validate::field("title", Constraint::Format, desc.title, Title::new)?;
        let summary = validate::field(
            "summary",
            Constraint::Length,
            desc.summary,
            Summary::new,
        )?;

        let mut tags = Set::new();
        for raw in desc.tags {
            let tag = validate::field("tags", Constraint::Length, raw, Tag::new)?;
            _ = tags.add(tag);
        }
        _ = tags.take_changes();

        let mut member_map = Map::new();
        for member in members {
            let member_id = member
                .id()
                .ok_or_else(|| {
                    validate::Error::violation("members", Constraint::Required)
                })?
                .clone();
            _ = member_map.set(member_id, member);
        }
        _ = member_map.take_changes();

        Ok(Self {
            id,
            owner,
            date,
            title,
            summary,
            tags,
            members: member_map,
        })
    }

    /// Returns the unique ID of this [`Channel`], if assigned already.
    #[must_use]
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Assigns the unique ID of this [`Channel`].
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

    /// Returns the [`User`] owning this [`Channel`].
    #[must_use]
    pub fn owner(&self) -> &User {
        &self.owner
    }

    /// Returns the [`DateTime`] when this [`Channel`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn date(&self) -> CreationDateTime {
        self.date
    }

    /// Returns the [`Title`] of this [`Channel`].
    #[must_use]
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Sets the [`Title`] of this [`Channel`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value does not match the title format.
    pub fn set_title(
        &mut self,
        title: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.title =
            validate::field("title", Constraint::Format, title.into(), Title::new)?;
        Ok(())
    }

    /// Returns the [`Summary`] of this [`Channel`].
    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Sets the [`Summary`] of this [`Channel`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_summary(
        &mut self,
        summary: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.summary = validate::field(
            "summary",
            Constraint::Length,
            summary.into(),
            Summary::new,
        )?;
        Ok(())
    }

    /// Returns the [`Tag`]s attached to this [`Channel`].
    #[must_use]
    pub fn tags(&self) -> &Set<Tag> {
        &self.tags
    }

    /// Indicates whether this [`Channel`] carries the provided [`Tag`].
    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.has(tag)
    }

    /// Attaches the provided tag to this [`Channel`].
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

    /// Detaches the provided [`Tag`] from this [`Channel`].
    pub fn remove_tag(&mut self, tag: &Tag) {
        _ = self.tags.remove(tag);
    }

    /// Replaces the [`Tag`]s of this [`Channel`] with the provided list.
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

    /// Returns the members of this [`Channel`], keyed by their
    /// [`user::Id`].
    #[must_use]
    pub fn members(&self) -> &Map<user::Id, User> {
        &self.members
    }

    /// Indicates whether the provided [`User`] is a member of this
    /// [`Channel`].
    ///
    /// The owner is not implicitly a member.
    #[must_use]
    pub fn has_member(&self, user: &User) -> bool {
        user.id().is_some_and(|id| self.members.has(id))
    }

    /// Adds the provided [`User`] to the members of this [`Channel`].
    ///
    /// Membership is keyed by the user's ID: adding the same user twice
    /// yields a single membership. A [`User`] without an assigned ID is
    /// ignored.
    pub fn add_member(&mut self, user: User) {
        if let Some(id) = user.id().cloned() {
            _ = self.members.set(id, user);
        }
    }

    /// Removes the provided [`User`] from the members of this [`Channel`].
    pub fn remove_member(&mut self, user: &User) {
        if let Some(id) = user.id() {
            _ = self.members.remove(id);
        }
    }

    /// Replaces the members of this [`Channel`] with the provided list.
    pub fn set_members(&mut self, members: impl IntoIterator<Item = User>) {
        let ids = self
            .members
            .iter()
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        for id in &ids {
            _ = self.members.remove(id);
        }
        for member in members {
            self.add_member(member);
        }
    }

    /// Translates this [`Channel`] into its persistable [`Descriptor`].
    ///
    /// # Panics
    ///
    /// Panics if the resolved owner has no assigned ID, which cannot happen
    /// for an owner read back from the persistence layer.
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            id: self.id.as_ref().map(ToString::to_string),
            owner: self
                .owner
                .id()
                .expect("persisted owner has an ID")
                .to_string(),
            date: self.date.to_rfc3339(),
            title: self.title.to_string(),
            summary: self.summary.to_string(),
            tags: self.tags.iter().map(ToString::to_string).collect(),
            members: {
                let mut ids = self
                    .members
                    .iter()
                    .map(|(id, _)| id.to_string())
                    .collect::<Vec<_>>();
                ids.sort_unstable();
                ids
            },
        }
    }
}

/// ID of a [`Channel`].
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

/// Title of a [`Channel`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Title`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-zA-Z0-9_.-]{1,100}$").expect("valid regex")
        });

        REGEX.is_match(title.as_ref())
    }
}

/// Summary of a [`Channel`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Summary(String);

impl Summary {
    /// Creates a new [`Summary`] if the given `summary` is valid.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Option<Self> {
        let summary = summary.into();
        (1..=100)
            .contains(&summary.chars().count())
            .then_some(Self(summary))
    }
}

/// [`DateTime`] when a [`Channel`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Channel, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{Channel, Descriptor};

    fn user(id: &str) -> user::User {
        user::User::new(user::Descriptor {
            id: Some(id.to_owned()),
            email: format!("{id}@domain.com"),
            password: user::User::hash_password(
                &user::Password::new("Admin1234").unwrap(),
            )
            .to_string(),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            rights: vec![],
        })
        .unwrap()
    }

    fn channel(members: Vec<user::User>) -> Channel {
        Channel::new(
            Descriptor {
                id: Some("a569d5e1f8".to_owned()),
                owner: "7eadb12963".to_owned(),
                date: DateTime::now().to_rfc3339(),
                title: "General".to_owned(),
                summary: "General informations".to_owned(),
                tags: vec!["report".to_owned()],
                members: members
                    .iter()
                    .filter_map(|m| m.id().map(ToString::to_string))
                    .collect(),
            },
            user("7eadb12963"),
            members,
        )
        .unwrap()
    }

    #[test]
    fn members_deduplicate_by_id() {
        let a = user("f8a41c551a");
        let b = user("de25901340");

        let mut channel = channel(vec![a.clone(), b.clone()]);
        channel.add_member(a.clone());

        assert_eq!(channel.members().len(), 2);
        assert!(channel.has_member(&a));
        assert!(channel.has_member(&b));

        channel.remove_member(&a);
        assert!(!channel.has_member(&a));
        assert_eq!(channel.members().len(), 1);
    }

    #[test]
    fn owner_is_not_implicitly_a_member() {
        let channel = channel(vec![]);
        assert!(!channel.has_member(&user("7eadb12963")));
    }

    #[test]
    fn descriptor_round_trip() {
        let a = user("f8a41c551a");
        let channel = channel(vec![a]);
        let desc = channel.descriptor();

        assert_eq!(desc.owner, "7eadb12963");
        assert_eq!(desc.members, vec!["f8a41c551a".to_owned()]);
        assert_eq!(desc.tags, vec!["report".to_owned()]);
    }
}
