//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
    sync::Arc,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::{sync::watch, task};

#[cfg(doc)]
use crate::Task;

/// Background environment for running [`Task`]s.
///
/// Spawned tasks observe a shared stop signal through a [`Stopper`]: once
/// [`StopHandle::stop()`] fires, a stop-aware task finishes its loop and
/// resolves, letting the whole environment drain cleanly.
#[derive(Debug)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Handles of spawned tasks.
    handles: Vec<task::JoinHandle<Result<(), Box<dyn Error + 'static>>>>,

    /// Sender side of the stop signal.
    stop: Arc<watch::Sender<bool>>,
}

impl Default for Background {
    fn default() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            set: task::LocalSet::new(),
            handles: Vec::new(),
            stop: Arc::new(stop),
        }
    }
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.handles.push(self.set.spawn_local(
            future.map_err(|e| Box::<dyn Error + 'static>::from(Box::new(e))),
        ));
    }

    /// Returns a [`Stopper`] observing this [`Background`]'s stop signal.
    #[must_use]
    pub fn stopper(&self) -> Stopper {
        Stopper(self.stop.subscribe())
    }

    /// Returns a [`StopHandle`] firing this [`Background`]'s stop signal.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Box<dyn Error>>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self {
            set,
            handles,
            stop: _,
        } = self;
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(
            handles.into_iter().map(|h| {
                h.map(|r| match r {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e),
                    Err(e) => {
                        Err(Box::<dyn Error + 'static>::from(Box::new(e)))
                    }
                })
                .boxed_local()
            }),
        ))
        .map_ok(drop)
        .boxed_local()
    }
}

/// Handle firing the stop signal of a [`Background`] environment.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<watch::Sender<bool>>);

impl StopHandle {
    /// Fires the stop signal.
    ///
    /// Every stop-aware [`Task`] cancels its pending timer and performs no
    /// further work.
    pub fn stop(&self) {
        _ = self.0.send(true);
    }
}

/// Observer of the stop signal of a [`Background`] environment.
#[derive(Debug)]
pub struct Stopper(watch::Receiver<bool>);

impl Stopper {
    /// Resolves once the stop signal fires (or its [`Background`] is gone).
    pub async fn stopped(&mut self) {
        loop {
            if *self.0.borrow() {
                return;
            }
            if self.0.changed().await.is_err() {
                return;
            }
        }
    }
}
