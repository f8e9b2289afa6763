//! [`SessionStore`] definitions.

use std::{collections::HashMap, time::Duration};

use common::pagination;
use derive_more::{Display, Error};
use parking_lot::RwLock;
use rand::RngCore as _;

use super::{Session, Token};

/// Number of random bytes in a generated [`Token`] by default.
pub const DEFAULT_TOKEN_SIZE: usize = 16;

/// [`SessionStore`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Number of random bytes in a generated [`Token`].
    pub token_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_size: DEFAULT_TOKEN_SIZE,
        }
    }
}

/// Process-local collection of live [`Session`]s, keyed by [`Token`].
///
/// The tokio runtime is multi-threaded, so every operation takes the inner
/// lock for its whole duration: a lookup-with-refresh, a mutation or a
/// removal is atomic with respect to any other operation on any token, and
/// a removal racing a lookup resolves to either "found and refreshed" or
/// "not found", never to a partially updated record.
///
/// Sessions have no persisted representation: a process restart invalidates
/// all of them.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Configuration of this [`SessionStore`].
    config: Config,

    /// Live [`Session`]s of this [`SessionStore`].
    sessions: RwLock<HashMap<Token, Session>>,
}

impl SessionStore {
    /// Creates a new empty [`SessionStore`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: RwLock::default(),
        }
    }

    /// Creates a new [`Session`] with a freshly generated unique [`Token`],
    /// an empty rights set and an empty data payload.
    ///
    /// Token generation retries until it misses every live token, so an
    /// existing [`Session`] is never overwritten.
    pub fn create(&self) -> Session {
        let mut sessions = self.sessions.write();

        let mut bytes = vec![0; self.config.token_size];
        let token = loop {
            rand::thread_rng().fill_bytes(&mut bytes);
            let token = Token::from_bytes(&bytes);
            if !sessions.contains_key(&token) {
                break token;
            }
        };

        let session = Session::new(token.clone());
        drop(sessions.insert(token, session.clone()));
        session
    }

    /// Looks up the [`Session`] under the provided [`Token`], sliding its
    /// `last_access_date` forward.
    ///
    /// A snapshot of the refreshed [`Session`] is returned.
    ///
    /// # Errors
    ///
    /// Errors with [`UnknownSession`] if the token does not resolve to a
    /// live [`Session`].
    pub fn get(&self, token: &Token) -> Result<Session, UnknownSession> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(token).ok_or(UnknownSession)?;
        session.touch();
        Ok(session.clone())
    }

    /// Mutates the [`Session`] under the provided [`Token`] with the given
    /// function, sliding its `last_access_date` forward.
    ///
    /// The mutation runs under the store lock, serialized with every other
    /// operation on the same token.
    ///
    /// # Errors
    ///
    /// Errors with [`UnknownSession`] if the token does not resolve to a
    /// live [`Session`].
    pub fn modify<R>(
        &self,
        token: &Token,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, UnknownSession> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(token).ok_or(UnknownSession)?;
        session.touch();
        Ok(f(session))
    }

    /// Removes the [`Session`] under the provided [`Token`].
    ///
    /// Returns whether a live [`Session`] was actually removed. The token
    /// no longer resolves afterwards.
    pub fn remove(&self, token: &Token) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Removes every [`Session`] idle longer than the provided timeout,
    /// returning the number of removed ones.
    pub fn remove_idle(&self, expire_after: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(expire_after));
        before - sessions.len()
    }

    /// Returns the number of live [`Session`]s in this [`SessionStore`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Indicates whether this [`SessionStore`] holds no live [`Session`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Returns the requested page of live [`Session`] snapshots, ordered by
    /// creation date (ties broken by token) so pages are stable between
    /// sweeps.
    #[must_use]
    pub fn paginated_list(
        &self,
        arguments: pagination::Arguments,
    ) -> pagination::Page<Session> {
        let sessions = self.sessions.read();
        let mut all = sessions.values().cloned().collect::<Vec<_>>();
        all.sort_unstable_by(|a, b| {
            a.creation_date()
                .cmp(&b.creation_date())
                .then_with(|| {
                    AsRef::<str>::as_ref(a.token())
                        .cmp(AsRef::<str>::as_ref(b.token()))
                })
        });
        arguments.paginate(all)
    }
}

/// Error of looking up a [`Session`] that is not live any more (or never
/// was).
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("session token does not resolve to a live session")]
pub struct UnknownSession;

#[cfg(test)]
mod spec {
    use std::{collections::HashSet, time::Duration};

    use common::pagination;

    use super::{Config, SessionStore, Token};

    #[test]
    fn creates_distinct_tokens() {
        let store = SessionStore::new(Config::default());

        let tokens = (0..1000)
            .map(|_| String::from(store.create().token().clone()))
            .collect::<HashSet<_>>();

        assert_eq!(tokens.len(), 1000);
        assert_eq!(store.len(), 1000);
        assert!(tokens.iter().all(|t| t.len() == 32));
    }

    #[test]
    fn get_refreshes_last_access_date() {
        let store = SessionStore::new(Config::default());
        let created = store.create();
        assert!(created.last_access_date() >= created.creation_date().coerce());

        let looked_up = store.get(created.token()).unwrap();
        assert!(looked_up.last_access_date() >= created.last_access_date());

        let again = store.get(created.token()).unwrap();
        assert!(again.last_access_date() >= looked_up.last_access_date());
    }

    #[test]
    fn removed_token_no_longer_resolves() {
        let store = SessionStore::new(Config::default());
        let session = store.create();

        assert!(store.remove(session.token()));
        assert!(!store.remove(session.token()));
        assert!(store.get(session.token()).is_err());
    }

    #[test]
    fn unknown_token_fails() {
        let store = SessionStore::new(Config::default());
        let token = Token::new("25fde3b96a").unwrap();

        assert!(store.get(&token).is_err());
        assert!(store.modify(&token, |_| ()).is_err());
    }

    #[test]
    fn sweep_removes_only_idle_sessions() {
        let store = SessionStore::new(Config::default());
        let idle = store.create();
        let fresh = store.create();

        // Zero timeout expires everything not accessed "in the future";
        // refresh `fresh` right before the sweep with a generous timeout
        // instead.
        _ = store.get(fresh.token()).unwrap();
        let removed = store.remove_idle(Duration::from_secs(3600));
        assert_eq!(removed, 0);

        std::thread::sleep(Duration::from_millis(2));
        let removed = store.remove_idle(Duration::ZERO);
        assert_eq!(removed, 2);
        assert!(store.get(idle.token()).is_err());
        assert!(store.get(fresh.token()).is_err());
    }

    #[test]
    fn paginates_by_creation_date() {
        let store = SessionStore::new(Config::default());
        for _ in 0..5 {
            _ = store.create();
        }

        let args = pagination::Arguments::new(Some(0), Some(3)).unwrap();
        let first = store.paginated_list(args);
        assert_eq!(first.items.len(), 3);

        let args = pagination::Arguments::new(Some(1), Some(3)).unwrap();
        let second = store.paginated_list(args);
        assert_eq!(second.items.len(), 2);
    }
}
