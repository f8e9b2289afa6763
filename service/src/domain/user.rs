//! [`User`] definitions.

use std::{fmt, str::FromStr, sync::LazyLock};

use common::{
    unit,
    validate::{self, Constraint},
    DateTimeOf,
};
use derive_more::{AsRef, Display, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::auth::{Right, RightsSet};

/// Resident or administrator of the community.
///
/// Every field write passes its declared validator before acceptance, so a
/// constructed [`User`] always holds validated data.
#[derive(Clone, Debug)]
pub struct User {
    /// Unique ID, absent until assigned by the persistence layer.
    id: Option<Id>,

    /// [`Email`] of this [`User`].
    email: Email,

    /// [`PasswordHash`] of this [`User`].
    password: PasswordHash,

    /// [`FirstName`] of this [`User`].
    first_name: FirstName,

    /// [`LastName`] of this [`User`].
    last_name: LastName,

    /// Granted [`Right`]s of this [`User`].
    rights: RightsSet,
}

/// Plain descriptor a [`User`] is populated from.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique ID, if already persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Email address.
    pub email: String,

    /// Hashed password (64 lowercase hex characters).
    pub password: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Granted rights list.
    #[serde(default)]
    pub rights: Vec<String>,
}

impl User {
    /// Constructs a new [`User`] by populating it from the provided
    /// [`Descriptor`].
    ///
    /// # Errors
    ///
    /// Errors if any field of the [`Descriptor`] violates its declared
    /// constraint. No partially populated [`User`] is observable.
    pub fn new(desc: Descriptor) -> Result<Self, validate::Error> {
        let id = desc
            .id
            .map(|id| {
                validate::field("id", Constraint::Format, id, Id::new)
            })
            .transpose()?;
        let email =
            validate::field("email", Constraint::Format, desc.email, Email::new)?;
        let password = validate::field(
            "password",
            Constraint::Format,
            desc.password,
            PasswordHash::from_stored,
        )?;
        let first_name = validate::field(
            "firstName",
            Constraint::Length,
            desc.first_name,
            FirstName::new,
        )?;
        let last_name = validate::field(
            "lastName",
            Constraint::Length,
            desc.last_name,
            LastName::new,
        )?;

        let mut rights = RightsSet::new();
        for raw in desc.rights {
            let right =
                validate::field("rights", Constraint::Format, raw, Right::new)?;
            _ = rights.add(right);
        }

        Ok(Self {
            id,
            email,
            password,
            first_name,
            last_name,
            rights,
        })
    }

    /// Returns the unique ID of this [`User`], if assigned already.
    #[must_use]
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Assigns the unique ID of this [`User`].
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

    /// Returns the [`Email`] of this [`User`].
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Sets the [`Email`] of this [`User`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is not a valid email address.
    pub fn set_email(
        &mut self,
        email: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.email =
            validate::field("email", Constraint::Format, email.into(), Email::new)?;
        Ok(())
    }

    /// Returns the [`PasswordHash`] of this [`User`].
    ///
    /// The clear password is hashed on write and never stored.
    #[must_use]
    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Sets the password of this [`User`] from its clear representation.
    ///
    /// The provided password is checked against the password policy and
    /// stored hashed.
    ///
    /// # Errors
    ///
    /// Errors if the provided value violates the password policy.
    pub fn set_password(
        &mut self,
        password: impl Into<String>,
    ) -> Result<(), validate::Error> {
        let password = validate::field(
            "password",
            Constraint::Format,
            password.into(),
            Password::new,
        )?;
        self.password = Self::hash_password(&password);
        Ok(())
    }

    /// Returns the [`FirstName`] of this [`User`].
    #[must_use]
    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    /// Sets the [`FirstName`] of this [`User`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_first_name(
        &mut self,
        first_name: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.first_name = validate::field(
            "firstName",
            Constraint::Length,
            first_name.into(),
            FirstName::new,
        )?;
        Ok(())
    }

    /// Returns the [`LastName`] of this [`User`].
    #[must_use]
    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    /// Sets the [`LastName`] of this [`User`].
    ///
    /// # Errors
    ///
    /// Errors if the provided value is out of the declared length bounds.
    pub fn set_last_name(
        &mut self,
        last_name: impl Into<String>,
    ) -> Result<(), validate::Error> {
        self.last_name = validate::field(
            "lastName",
            Constraint::Length,
            last_name.into(),
            LastName::new,
        )?;
        Ok(())
    }

    /// Returns the granted [`Right`]s of this [`User`].
    #[must_use]
    pub fn rights(&self) -> &RightsSet {
        &self.rights
    }

    /// Replaces the granted [`Right`]s of this [`User`] with the provided
    /// list.
    ///
    /// # Errors
    ///
    /// Errors if any of the provided values is not a valid [`Right`] token.
    /// Nothing is replaced in that case.
    pub fn set_rights(
        &mut self,
        rights: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), validate::Error> {
        let mut replacement = RightsSet::new();
        for raw in rights {
            let right = validate::field(
                "rights",
                Constraint::Format,
                raw.into(),
                Right::new,
            )?;
            _ = replacement.add(right);
        }
        self.rights = replacement;
        Ok(())
    }

    /// Indicates whether this [`User`] has the provided right, either
    /// exactly or through a wildcard grant.
    #[must_use]
    pub fn has_right(&self, right: &str) -> bool {
        self.rights.has(right)
    }

    /// Translates this [`User`] into its persistable [`Descriptor`].
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            id: self.id.as_ref().map(ToString::to_string),
            email: self.email.to_string(),
            password: self.password.to_string(),
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            rights: self.rights.tokens(),
        }
    }

    /// Hashes the given clear password.
    ///
    /// The hash is deterministic: equal passwords always produce equal
    /// hashes.
    #[must_use]
    pub fn hash_password(password: &Password) -> PasswordHash {
        let digest = Sha256::digest(password.as_ref().as_bytes());
        PasswordHash(hex::encode(digest))
    }
}

/// ID of a [`User`].
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

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        !address.is_empty()
            && address.len() <= 100
            && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Clear password of a [`User`].
///
/// Exists only transiently: the [`User`] entity stores a [`PasswordHash`].
#[derive(Clone, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` satisfies the
    /// password policy.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` satisfies the password policy:
    /// at least one lowercase letter, one uppercase letter and one digit,
    /// between 6 and 100 characters long.
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        (6..=100).contains(&password.chars().count())
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`]: 64 lowercase hex characters of a SHA-256
/// digest.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] from its stored representation, if
    /// valid.
    #[must_use]
    pub fn from_stored(stored: impl Into<String>) -> Option<Self> {
        let stored = stored.into();
        Self::check(&stored).then_some(Self(stored))
    }

    /// Checks whether the given `stored` value is a valid [`PasswordHash`].
    fn check(stored: impl AsRef<str>) -> bool {
        let stored = stored.as_ref();
        stored.len() == 64
            && stored
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

/// First name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct FirstName(String);

impl FirstName {
    /// Creates a new [`FirstName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (1..=40).contains(&name.chars().count()).then_some(Self(name))
    }
}

impl FromStr for FirstName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FirstName`")
    }
}

/// Last name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct LastName(String);

impl LastName {
    /// Creates a new [`LastName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (1..=40).contains(&name.chars().count()).then_some(Self(name))
    }
}

impl FromStr for LastName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `LastName`")
    }
}

/// [`DateTime`] when a [`User`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::validate::Constraint;

    use super::{Descriptor, Password, User};

    fn descriptor() -> Descriptor {
        Descriptor {
            id: Some("7eadb12963".to_owned()),
            email: "jane.doe@domain.com".to_owned(),
            password: User::hash_password(
                &Password::new("Admin1234").unwrap(),
            )
            .to_string(),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            rights: vec!["articles.create".to_owned(), "channels.*".to_owned()],
        }
    }

    #[test]
    fn populates_from_descriptor() {
        let user = User::new(descriptor()).unwrap();

        assert_eq!(user.id().unwrap().as_ref(), "7eadb12963");
        assert_eq!(user.email().to_string(), "jane.doe@domain.com");
        assert_eq!(user.first_name().to_string(), "Jane");
        assert_eq!(user.last_name().to_string(), "Doe");
        assert!(user.has_right("articles.create"));
        assert!(user.has_right("channels.modify"));
        assert!(!user.has_right("users.remove"));
    }

    #[test]
    fn rejects_invalid_email() {
        let mut desc = descriptor();
        desc.email = "not an email".to_owned();

        let err = User::new(desc).unwrap_err();
        assert_eq!(err.violations[0].field, "email");
        assert_eq!(err.violations[0].constraint, Constraint::Format);
    }

    #[test]
    fn rejects_clear_password_in_descriptor() {
        let mut desc = descriptor();
        desc.password = "Admin1234".to_owned();

        let err = User::new(desc).unwrap_err();
        assert_eq!(err.violations[0].field, "password");
    }

    #[test]
    fn hashing_is_deterministic_and_clear_text_never_stored() {
        let password = Password::new("Admin1234").unwrap();
        let first = User::hash_password(&password);
        let second = User::hash_password(&password);
        assert_eq!(first, second);

        let mut user = User::new(descriptor()).unwrap();
        user.set_password("Admin1234").unwrap();
        assert_eq!(user.password(), &first);
        assert_ne!(user.password().to_string(), "Admin1234");
        assert_eq!(user.descriptor().password, first.to_string());
    }

    #[test]
    fn password_policy() {
        assert!(Password::new("Admin1234").is_some());
        assert!(Password::new("admin1234").is_none());
        assert!(Password::new("ADMIN1234").is_none());
        assert!(Password::new("Admintest").is_none());
        assert!(Password::new("Ad1").is_none());
    }

    #[test]
    fn id_is_immutable_once_set() {
        let mut user = User::new(descriptor()).unwrap();
        assert!(user.assign_id(super::Id::generate()).is_err());

        let mut desc = descriptor();
        desc.id = None;
        let mut user = User::new(desc).unwrap();
        assert!(user.id().is_none());
        user.assign_id(super::Id::generate()).unwrap();
        assert!(user.assign_id(super::Id::generate()).is_err());
    }
}
