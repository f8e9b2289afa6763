//! [`ExpireSessions`] [`Task`].

use std::{convert::Infallible, error::Error, time::Duration};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracing as log;

use crate::Service;

use super::{Stopper, Task};

/// Configuration for the [`ExpireSessions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between two sweeps.
    pub interval: Duration,

    /// Idle timeout after which a session expires.
    pub expire_after: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 3),
            expire_after: Duration::from_secs(3600 * 6),
        }
    }
}

/// [`Task`] sweeping idle sessions out of the session store.
///
/// The sweep is the only actor removing a session its client did not
/// explicitly log out of. It runs on a fixed interval until the stop
/// signal fires, which cancels the pending tick and stops further sweeps.
#[derive(Debug)]
pub struct ExpireSessions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ExpireSessions<Self>, (Config, Stopper)>>>
    for Service<Db>
where
    ExpireSessions<Self>: Task<Perform<()>, Ok = usize, Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpireSessions<Self>, (Config, Stopper)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (config, mut stopper) = by.into_inner();
        let task = ExpireSessions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            tokio::select! {
                () = stopper.stopped() => {
                    log::info!("`task::ExpireSessions` stopped");
                    return Ok(());
                }
                _ = interval.tick() => {
                    match task.execute(Perform(())).await {
                        Ok(0) => {}
                        Ok(expired) => {
                            log::debug!("expired {expired} idle sessions");
                        }
                        Err(e) => {
                            log::error!("`task::ExpireSessions` failed: {e}");
                        }
                    }
                }
            }
        }
    }
}

impl<Db> Task<Perform<()>> for ExpireSessions<Service<Db>> {
    type Ok = usize;
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .service
            .sessions()
            .remove_idle(self.config.expire_after))
    }
}
