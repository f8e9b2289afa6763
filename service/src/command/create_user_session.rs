//! [`Command`] for creating a [`Session`] out of [`User`] credentials.

use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use common::operations::{By, Select};

use crate::{
    auth::{self, Session},
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] out of [`User`] credentials.
///
/// On success the fresh [`Session`] is granted every right of the
/// authenticated [`User`], and the [`User`] occupies the session's
/// canonical data slot.
#[derive(Debug)]
pub struct CreateUserSession {
    /// [`user::Email`] to authenticate with.
    pub email: user::Email,

    /// Clear [`user::Password`] to authenticate with.
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { email, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongCredentials)
            .map_err(tracerr::wrap!())?;

        let hash = User::hash_password(password.expose_secret());
        if &hash != user.password() {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        let session = self.sessions().create();
        self.sessions()
            .modify(session.token(), |session| {
                session.rights_mut().extend(user.rights().rights());
                session.data_mut().user = Some(user.clone());
                session.clone()
            })
            .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Fresh [`Session`] vanished before its initialization.
    #[display("fresh `Session` vanished before initialization: {_0}")]
    SessionVanished(auth::UnknownSession),

    /// [`CreateUserSession`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{self, Command as _},
        domain::user,
        infra::Memory,
        Config, Service,
    };

    use super::{CreateUserSession, ExecutionError};

    fn credentials(password: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(password).unwrap()))
    }

    async fn service_with_user() -> Service<Memory> {
        let (service, _bg) = Service::new(Config::default(), Memory::new());
        let _ = service
            .execute(command::CreateUser {
                email: "jane.doe@domain.com".to_owned(),
                password: credentials("Admin1234"),
                first_name: "Jane".to_owned(),
                last_name: "Doe".to_owned(),
                rights: vec!["channels.*".to_owned()],
            })
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn authenticates_and_authorizes() {
        let service = service_with_user().await;

        let session = service
            .execute(CreateUserSession {
                email: user::Email::new("jane.doe@domain.com").unwrap(),
                password: credentials("Admin1234"),
            })
            .await
            .unwrap();

        assert!(session.rights().has("channels.modify"));
        assert_eq!(
            session.user().unwrap().email().to_string(),
            "jane.doe@domain.com",
        );

        let authorized = service
            .execute(command::AuthorizeUserSession {
                token: session.token().clone(),
            })
            .await
            .unwrap();
        assert!(authorized.last_access_date() >= session.last_access_date());

        let removed = service
            .execute(command::RemoveUserSession {
                token: session.token().clone(),
            })
            .await
            .unwrap();
        assert!(removed);
        assert!(service
            .execute(command::AuthorizeUserSession {
                token: session.token().clone(),
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let service = service_with_user().await;

        let err = service
            .execute(CreateUserSession {
                email: user::Email::new("jane.doe@domain.com").unwrap(),
                password: credentials("Wrong1234"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));

        let err = service
            .execute(CreateUserSession {
                email: user::Email::new("john.doe@domain.com").unwrap(),
                password: credentials("Admin1234"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
