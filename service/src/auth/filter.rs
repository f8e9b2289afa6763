//! Authorization filters gating operations on resolved [`Session`] state.
//!
//! Every filter is a pure predicate over an already-resolved [`Session`]
//! and resource state, with a binary outcome: the operation proceeds, or it
//! is rejected with [`Forbidden`]. Filters must run strictly before the
//! operation they gate mutates anything.

use derive_more::{Display, Error};

use crate::domain::{user, Channel};

use super::{Session, Token};

/// Error of an authorization filter rejecting an operation.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("insufficient rights")]
pub struct Forbidden;

/// Requires the [`Session`] to hold the provided right.
///
/// # Errors
///
/// Errors with [`Forbidden`] unless the right is granted.
pub fn require_right(
    session: &Session,
    right: &str,
) -> Result<(), Forbidden> {
    if session.rights().has(right) {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Requires the [`Session`] to hold the provided right, or its user to be
/// the owner of the targeted resource.
///
/// # Errors
///
/// Errors with [`Forbidden`] if neither condition holds.
pub fn require_owner_or_right(
    session: &Session,
    right: &str,
    owner: &user::Id,
) -> Result<(), Forbidden> {
    if session.rights().has(right) || is_user(session, owner) {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Requires the [`Session`] to hold the provided right, or its user to be
/// the owner of the [`Channel`] or present in its member map.
///
/// # Errors
///
/// Errors with [`Forbidden`] if none of the conditions hold.
pub fn require_member_or_right(
    session: &Session,
    right: &str,
    channel: &Channel,
) -> Result<(), Forbidden> {
    if session.rights().has(right) {
        return Ok(());
    }
    let Some(user) = session.user() else {
        return Err(Forbidden);
    };
    let owns = channel.owner().id() == user.id();
    if owns || channel.has_member(user) {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Requires the [`Session`] to hold the provided right, or its user to be
/// the subject itself.
///
/// # Errors
///
/// Errors with [`Forbidden`] if neither condition holds.
pub fn require_self_or_right(
    session: &Session,
    right: &str,
    subject: &user::Id,
) -> Result<(), Forbidden> {
    if session.rights().has(right) || is_user(session, subject) {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Requires the [`Session`] to hold the provided right, or to be the very
/// session the provided [`Token`] addresses.
///
/// # Errors
///
/// Errors with [`Forbidden`] if neither condition holds.
pub fn require_token_or_right(
    session: &Session,
    right: &str,
    token: &Token,
) -> Result<(), Forbidden> {
    if session.rights().has(right) || session.token() == token {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Indicates whether the [`Session`]'s authenticated user has the provided
/// ID.
fn is_user(session: &Session, id: &user::Id) -> bool {
    session
        .user()
        .and_then(user::User::id)
        .is_some_and(|user_id| user_id == id)
}

#[cfg(test)]
mod spec {
    use crate::{
        auth::{Right, SessionStore},
        domain::user,
    };

    use super::{
        require_member_or_right, require_owner_or_right, require_right,
        require_self_or_right, require_token_or_right,
    };

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

    #[test]
    fn owner_or_right_scenario() {
        let store = SessionStore::new(super::super::store::Config::default());
        let session = store.create();
        let owner = user::Id::new("7eadb12963").unwrap();

        // Right present, different user: passes.
        let session = store
            .modify(session.token(), |s| {
                _ = s.rights_mut().add(Right::new("channels.modify").unwrap());
                s.data_mut().user = Some(user("f8a41c551a"));
                s.clone()
            })
            .unwrap();
        require_owner_or_right(&session, "channels.modify", &owner).unwrap();

        // Right removed, owning user: passes.
        let session = store
            .modify(session.token(), |s| {
                _ = s
                    .rights_mut()
                    .remove(&Right::new("channels.modify").unwrap());
                s.data_mut().user = Some(user("7eadb12963"));
                s.clone()
            })
            .unwrap();
        require_owner_or_right(&session, "channels.modify", &owner).unwrap();

        // Neither: rejected.
        let session = store
            .modify(session.token(), |s| {
                s.data_mut().user = Some(user("f8a41c551a"));
                s.clone()
            })
            .unwrap();
        assert!(
            require_owner_or_right(&session, "channels.modify", &owner)
                .is_err(),
        );
    }

    #[test]
    fn right_filter() {
        let store = SessionStore::new(super::super::store::Config::default());
        let session = store.create();
        assert!(require_right(&session, "sessions.list").is_err());

        let session = store
            .modify(session.token(), |s| {
                _ = s.rights_mut().add(Right::new("sessions.*").unwrap());
                s.clone()
            })
            .unwrap();
        require_right(&session, "sessions.list").unwrap();
    }

    #[test]
    fn self_filter() {
        let store = SessionStore::new(super::super::store::Config::default());
        let session = store
            .modify(store.create().token(), |s| {
                s.data_mut().user = Some(user("7eadb12963"));
                s.clone()
            })
            .unwrap();

        let own = user::Id::new("7eadb12963").unwrap();
        let other = user::Id::new("f8a41c551a").unwrap();
        require_self_or_right(&session, "users.view", &own).unwrap();
        assert!(require_self_or_right(&session, "users.view", &other).is_err());
    }

    #[test]
    fn token_filter() {
        let store = SessionStore::new(super::super::store::Config::default());
        let session = store.create();
        let other = store.create();

        require_token_or_right(&session, "sessions.view", session.token())
            .unwrap();
        assert!(require_token_or_right(
            &session,
            "sessions.view",
            other.token(),
        )
        .is_err());
    }

    #[test]
    fn membership_grants_access() {
        use crate::domain::channel;

        let owner = user("7eadb12963");
        let member = user("f8a41c551a");
        let outsider = user("de25901340");

        let mut channel = channel::Channel::new(
            channel::Descriptor {
                id: Some("a569d5e1f8".to_owned()),
                owner: "7eadb12963".to_owned(),
                date: common::DateTime::now().to_rfc3339(),
                title: "General".to_owned(),
                summary: "General informations".to_owned(),
                tags: vec![],
                members: vec![],
            },
            owner.clone(),
            vec![],
        )
        .unwrap();
        channel.add_member(member.clone());

        let store = SessionStore::new(super::super::store::Config::default());
        for (u, expected) in [
            (owner, true),
            (member, true),
            (outsider, false),
        ] {
            let session = store
                .modify(store.create().token(), |s| {
                    s.data_mut().user = Some(u.clone());
                    s.clone()
                })
                .unwrap();
            assert_eq!(
                require_member_or_right(&session, "channels.view", &channel)
                    .is_ok(),
                expected,
            );
        }
    }
}
