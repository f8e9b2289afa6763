//! [`Meeting`] definitions.

use std::{str::FromStr, sync::LazyLock};

use common::{
    association::{Map, Sequence},
    define_kind, unit,
    validate::{self, Constraint},
    DateTimeOf,
};
use derive_more::{AsRef, Display, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{user, User};

define_kind! {
    #[doc = "Status of a [`Meeting`]."]
    enum Status {
        #[doc = "Scheduled, waiting for enough confirmations."]
        Pending,

        #[doc = "Canceled by its creator, an administrator or a rejecting \
                 majority. Terminal."]
        Canceled,

        #[doc = "Confirmed by a majority, waiting to be held."]
        Confirmed,

        #[doc = "Held, with its report published. Terminal."]
        Done,
    }
}

impl Status {
    /// Returns the [`Status`]es reachable from this one.
    #[must_use]
    pub const fn descendants(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Canceled, Self::Confirmed],
            Self::Confirmed => &[Self::Canceled, Self::Done],
            Self::Canceled | Self::Done => &[],
        }
    }

    /// Indicates whether this [`Status`] may transition into `next`.
    #[must_use]
    pub fn allows(self, next: Self) -> bool {
        self.descendants().contains(&next)
    }
}

/// Council meeting planned by a community member.
#[derive(Clone, Debug)]
pub struct Meeting {
    /// Unique ID, absent until assigned by the persistence layer.
    id: Option<Id>,

    /// Current [`Status`] of this [`Meeting`].
    status: Status,

    /// [`User`] who planned this [`Meeting`].
    user: User,

    /// [`DateTime`] this [`Meeting`] is planned at.
    ///
    /// [`DateTime`]: common::DateTime
    date: PlannedDateTime,

    /// [`Location`] this [`Meeting`] is planned at.
    location: Location,

    /// Ordered agenda of this [`Meeting`].
    agenda: Sequence<AgendaItem>,

    /// [`User`]s having confirmed their attendance, keyed by their ID.
    confirmations: Map<user::Id, User>,

    /// [`User`]s having rejected their attendance, keyed by their ID.
    rejections: Map<user::Id, User>,
}

/// Plain descriptor a [`Meeting`] is populated from.
///
/// Reference fields carry IDs; the referenced [`User`]s are resolved by the
/// persistence layer and passed to [`Meeting::new()`] separately.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique ID, if already persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Current status wire name.
    pub status: String,

    /// ID of the planning user.
    pub user: String,

    /// Planned date, in RFC 3339 form.
    pub date: String,

    /// Planned location.
    pub location: String,

    /// Agenda items, in order.
    pub agenda: Vec<String>,

    /// IDs of the users having confirmed their attendance.
    #[serde(default)]
    pub confirmations: Vec<String>,

    /// IDs of the users having rejected their attendance.
    #[serde(default)]
    pub rejections: Vec<String>,
}

impl Meeting {
    /// Constructs a new [`Meeting`] by populating it from the provided
    /// [`Descriptor`] and the resolved `user`, `confirmations` and
    /// `rejections`.
    ///
    /// # Errors
    ///
    /// Errors if any field of the [`Descriptor`] violates its declared
    /// constraint, or if the resolved `user`'s ID does not match the
    /// descriptor's reference.
    pub fn new(
        desc: Descriptor,
        user: User,
        confirmations: Vec<User>,
        rejections: Vec<User>,
    ) -> Result<Self, validate::Error> {
        let id = desc
            .id
            .map(|id| validate::field("id", Constraint::Format, id, Id::new))
            .transpose()?;
        let status =
            validate::field("status", Constraint::Allowed, desc.status, |raw| {
                Status::from_str(&raw).ok()
            })?;

        let user_id =
            validate::field("user", Constraint::Format, desc.user, |raw| {
                user::Id::new(raw)
            })?;
        if user.id() != Some(&user_id) {
            return Err(validate::Error::violation("user", Constraint::Allowed));
        }

        let date = validate::field("date", Constraint::Format, desc.date, |raw| {
            PlannedDateTime::from_rfc3339(&raw).ok()
        })?;
        let location = validate::field(
            "location",
            Constraint::Length,
            desc.location,
            Location::new,
        )?;

        let mut agenda = Sequence::new();
        for raw in desc.agenda {
            let item = validate::field(
                "agenda",
                Constraint::Length,
                raw,
                AgendaItem::new,
            )?;
            agenda.push(item);
        }
        _ = agenda.take_changes();

        let confirmations = Self::member_map("confirmations", confirmations)?;
        let rejections = Self::member_map("rejections", rejections)?;

        Ok(Self {
            id,
            status,
            user,
            date,
            location,
            agenda,
            confirmations,
            rejections,
        })
    }

    /// Builds an ID-keyed [`Map`] out of resolved [`User`]s.
    fn member_map(
        field: &str,
        users: Vec<User>,
    ) -> Result<Map<user::Id, User>, validate::Error> {
        let mut map = Map::new();
        for user in users {
            let id = user
                .id()
                .ok_or_else(|| {
                    validate::Error::violation(field, Constraint::Required)
                })?
                .clone();
            _ = map.set(id, user);
        }
        _ = map.take_changes();
        Ok(map)
    }

    /// Returns the unique ID of this [`Meeting`], if assigned already.
    #[must_use]
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Assigns the unique ID of this [`Meeting`].
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

    /// Returns the current [`Status`] of this [`Meeting`].
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Transitions this [`Meeting`] into the provided [`Status`].
    ///
    /// The transition is validated against the current status's
    /// descendants: `PENDING` may become `CANCELED` or `CONFIRMED`,
    /// `CONFIRMED` may become `CANCELED` or `DONE`, and `CANCELED`/`DONE`
    /// are terminal.
    ///
    /// # Errors
    ///
    /// Errors if the current [`Status`] does not allow the transition.
    pub fn set_status(&mut self, status: Status) -> Result<(), validate::Error> {
        if !self.status.allows(status) {
            return Err(validate::Error::violation(
                "status",
                Constraint::Transition,
            ));
        }
        self.status = status;
        Ok(())
    }

    /// Returns the [`User`] who planned this [`Meeting`].
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the [`DateTime`] this [`Meeting`] is planned at.
    ///
    /// [`DateTime`]: common::DateTime
    #[must_use]
    pub fn date(&self) -> PlannedDateTime {
        self.date
    }

    /// Sets the [`DateTime`] this [`Meeting`] is planned at.
    ///
    /// [`DateTime`]: common::DateTime
    pub fn set_date(&mut self, date: PlannedDateTime) {
        self.date = date;
    }

    /// Returns the [`Location`] this [`Meeting`] is planned at.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Sets the [`Location`] this [`Meeting`] is planned at.
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_location(
        &mut self,
        location: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.location = validate::field(
            "location",
            Constraint::Length,
            location.into(),
            Location::new,
        )?;
        Ok(())
    }

    /// Returns the ordered agenda of this [`Meeting`].
    #[must_use]
    pub fn agenda(&self) -> &Sequence<AgendaItem> {
        &self.agenda
    }

    /// Appends an item to the agenda of this [`Meeting`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is not a valid [`AgendaItem`].
    pub fn add_agenda_item(
        &mut self,
        item: impl Into<String>,
    ) -> Result<(), validate::Error> {
        let item = validate::field(
            "agenda",
            Constraint::Length,
            item.into(),
            AgendaItem::new,
        )?;
        self.agenda.push(item);
        Ok(())
    }

    /// Inserts an item at the provided index of the agenda, shifting later
    /// items.
    ///
    /// # Errors
    ///
    /// Errors if the provided value is not a valid [`AgendaItem`], or if
    /// the index is past the end of the agenda.
    pub fn insert_agenda_item(
        &mut self,
        index: usize,
        item: impl Into<String>,
    ) -> Result<(), validate::Error> {
        let item = validate::field(
            "agenda",
            Constraint::Length,
            item.into(),
            AgendaItem::new,
        )?;
        if !self.agenda.insert(index, item) {
            return Err(validate::Error::violation(
                "agenda",
                Constraint::Allowed,
            ));
        }
        Ok(())
    }

    /// Removes the item at the provided index of the agenda, if any.
    pub fn remove_agenda_item(&mut self, index: usize) -> Option<AgendaItem> {
        self.agenda.remove(index)
    }

    /// Returns the [`User`]s having confirmed their attendance, keyed by
    /// their ID.
    #[must_use]
    pub fn confirmations(&self) -> &Map<user::Id, User> {
        &self.confirmations
    }

    /// Adds the provided [`User`]'s attendance confirmation, dropping their
    /// eventual rejection.
    ///
    /// A [`User`] without an assigned ID is ignored.
    pub fn add_confirmation(&mut self, user: User) {
        if let Some(id) = user.id().cloned() {
            _ = self.rejections.remove(&id);
            _ = self.confirmations.set(id, user);
        }
    }

    /// Returns the [`User`]s having rejected their attendance, keyed by
    /// their ID.
    #[must_use]
    pub fn rejections(&self) -> &Map<user::Id, User> {
        &self.rejections
    }

    /// Adds the provided [`User`]'s attendance rejection, dropping their
    /// eventual confirmation.
    ///
    /// A [`User`] without an assigned ID is ignored.
    pub fn add_rejection(&mut self, user: User) {
        if let Some(id) = user.id().cloned() {
            _ = self.confirmations.remove(&id);
            _ = self.rejections.set(id, user);
        }
    }

    /// Translates this [`Meeting`] into its persistable [`Descriptor`].
    ///
    /// # Panics
    ///
    /// Panics if the resolved planning user has no assigned ID, which
    /// cannot happen for a user read back from the persistence layer.
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        let ids = |map: &Map<user::Id, User>| {
            let mut ids =
                map.iter().map(|(id, _)| id.to_string()).collect::<Vec<_>>();
            ids.sort_unstable();
            ids
        };

        Descriptor {
            id: self.id.as_ref().map(ToString::to_string),
            status: self.status.to_string(),
            user: self
                .user
                .id()
                .expect("persisted user has an ID")
                .to_string(),
            date: self.date.to_rfc3339(),
            location: self.location.to_string(),
            agenda: self.agenda.iter().map(ToString::to_string).collect(),
            confirmations: ids(&self.confirmations),
            rejections: ids(&self.rejections),
        }
    }
}

/// ID of a [`Meeting`].
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

/// Location a [`Meeting`] is planned at.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        (1..=100)
            .contains(&location.chars().count())
            .then_some(Self(location))
    }
}

/// Single item of a [`Meeting`] agenda.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct AgendaItem(String);

impl AgendaItem {
    /// Creates a new [`AgendaItem`] if the given `item` is valid.
    #[must_use]
    pub fn new(item: impl Into<String>) -> Option<Self> {
        let item = item.into();
        (1..=100)
            .contains(&item.chars().count())
            .then_some(Self(item))
    }
}

/// [`DateTime`] a [`Meeting`] is planned at.
///
/// [`DateTime`]: common::DateTime
pub type PlannedDateTime = DateTimeOf<(Meeting, unit::Planning)>;

#[cfg(test)]
mod spec {
    use common::{validate::Constraint, DateTime};

    use crate::domain::user;

    use super::{Descriptor, Meeting, Status};

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

    fn meeting() -> Meeting {
        Meeting::new(
            Descriptor {
                id: Some("de25901340".to_owned()),
                status: "PENDING".to_owned(),
                user: "7eadb12963".to_owned(),
                date: DateTime::now().to_rfc3339(),
                location: "Community hall".to_owned(),
                agenda: vec![
                    "Budget review".to_owned(),
                    "Garden renovation".to_owned(),
                ],
                confirmations: vec![],
                rejections: vec![],
            },
            user("7eadb12963"),
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn transitions_follow_the_graph() {
        let mut meeting = meeting();
        assert_eq!(meeting.status(), Status::Pending);

        // PENDING -> DONE is not an edge.
        let err = meeting.set_status(Status::Done).unwrap_err();
        assert_eq!(err.violations[0].constraint, Constraint::Transition);

        meeting.set_status(Status::Confirmed).unwrap();
        meeting.set_status(Status::Done).unwrap();

        // DONE is terminal.
        assert!(meeting.set_status(Status::Pending).is_err());
        assert!(meeting.set_status(Status::Canceled).is_err());
    }

    #[test]
    fn pending_may_be_canceled() {
        let mut meeting = meeting();
        meeting.set_status(Status::Canceled).unwrap();
        assert!(meeting.set_status(Status::Confirmed).is_err());
    }

    #[test]
    fn agenda_is_ordered() {
        let mut meeting = meeting();
        meeting.insert_agenda_item(1, "Car park").unwrap();
        meeting.add_agenda_item("Questions").unwrap();

        assert_eq!(
            meeting
                .agenda()
                .iter()
                .map(AsRef::<str>::as_ref)
                .collect::<Vec<_>>(),
            [
                "Budget review",
                "Car park",
                "Garden renovation",
                "Questions",
            ],
        );

        assert!(meeting.insert_agenda_item(9, "Too far").is_err());
        assert!(meeting.remove_agenda_item(1).is_some());
        assert_eq!(meeting.agenda().len(), 3);
    }

    #[test]
    fn confirmation_and_rejection_are_mutually_exclusive() {
        let mut meeting = meeting();
        let attendee = user("f8a41c551a");

        meeting.add_confirmation(attendee.clone());
        assert_eq!(meeting.confirmations().len(), 1);

        meeting.add_rejection(attendee.clone());
        assert_eq!(meeting.confirmations().len(), 0);
        assert_eq!(meeting.rejections().len(), 1);

        meeting.add_confirmation(attendee);
        assert_eq!(meeting.confirmations().len(), 1);
        assert_eq!(meeting.rejections().len(), 0);
    }

    #[test]
    fn rejects_unknown_status() {
        let user_entity = user("7eadb12963");
        let err = Meeting::new(
            Descriptor {
                id: None,
                status: "SCHEDULED".to_owned(),
                user: "7eadb12963".to_owned(),
                date: DateTime::now().to_rfc3339(),
                location: "Community hall".to_owned(),
                agenda: vec![],
                confirmations: vec![],
                rejections: vec![],
            },
            user_entity,
            vec![],
            vec![],
        )
        .unwrap_err();

        assert_eq!(err.violations[0].field, "status");
        assert_eq!(err.violations[0].constraint, Constraint::Allowed);
    }
}
