//! [`Command`] for modifying an existing [`User`].

use common::{
    operations::{By, Select, Update},
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

/// [`Command`] for modifying an existing [`User`].
///
/// Only the provided fields are modified; every modification passes the
/// field's declared validator before anything is persisted.
#[derive(Debug)]
pub struct ModifyUser {
    /// [`User`] to modify.
    pub user: User,

    /// New email address, if changing.
    pub email: Option<String>,

    /// New clear [`user::Password`], if changing.
    pub password: Option<SecretBox<user::Password>>,

    /// New first name, if changing.
    pub first_name: Option<String>,

    /// New last name, if changing.
    pub last_name: Option<String>,

    /// New granted rights, if changing.
    pub rights: Option<Vec<String>>,
}

impl<Db> Command<ModifyUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ModifyUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ModifyUser {
            mut user,
            email,
            password,
            first_name,
            last_name,
            rights,
        } = cmd;

        if let Some(email) = email {
            let before = user.email().clone();
            user.set_email(email).map_err(tracerr::from_and_wrap!(=> E))?;
            if user.email() != &before {
                let occupied = self
                    .database()
                    .execute(Select(By::new(user.email())))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .is_some();
                if occupied {
                    return Err(tracerr::new!(E::DuplicateEmail));
                }
            }
        }
        if let Some(password) = password {
            user.set_password(password.expose_secret().as_ref())
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(first_name) = first_name {
            user.set_first_name(first_name)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(last_name) = last_name {
            user.set_last_name(last_name)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(rights) = rights {
            user.set_rights(rights).map_err(tracerr::from_and_wrap!(=> E))?;
        }

        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`ModifyUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Another [`User`] already uses the provided email address.
    #[display("`User` with the provided email already exists")]
    DuplicateEmail,

    /// Provided modification failed its validation.
    #[display("`User` validation failed: {_0}")]
    Validation(validate::Error),
}
