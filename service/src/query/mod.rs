//! [`Query`] definition.

pub mod article;
pub mod articles;
pub mod channel;
pub mod channel_messages;
pub mod channels;
pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
    B: Clone,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    /// Executes the [`Select`], retrying it once on an upstream failure.
    ///
    /// A [`Select`] is an idempotent read, so one retry cannot duplicate
    /// any side effect; mutating operations are never retried.
    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        let by = by.into_inner();
        let retry = by.clone();
        match self.database().execute(Select(By::new(by))).await {
            Ok(ok) => Ok(ok),
            Err(e) => {
                log::warn!("retrying failed `Select`: {}", e.as_ref());
                self.database()
                    .execute(Select(By::new(retry)))
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    }
}
