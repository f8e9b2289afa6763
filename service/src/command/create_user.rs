//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    validate,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// Email address of the new [`User`].
    pub email: String,

    /// Clear [`user::Password`] of the new [`User`].
    pub password: SecretBox<user::Password>,

    /// First name of the new [`User`].
    pub first_name: String,

    /// Last name of the new [`User`].
    pub last_name: String,

    /// Rights granted to the new [`User`].
    pub rights: Vec<String>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<User>,
            Ok = user::Id,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            email,
            password,
            first_name,
            last_name,
            rights,
        } = cmd;

        let hash = User::hash_password(password.expose_secret());
        let mut user = User::new(user::Descriptor {
            id: None,
            email,
            password: hash.to_string(),
            first_name,
            last_name,
            rights,
        })
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let existing = self
            .database()
            .execute(Select(By::new(user.email())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::DuplicateEmail));
        }

        let id = self
            .database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        user.assign_id(id).map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Another [`User`] already uses the provided email address.
    #[display("`User` with the provided email already exists")]
    DuplicateEmail,

    /// Provided descriptor failed its validation.
    #[display("`User` validation failed: {_0}")]
    Validation(validate::Error),
}
