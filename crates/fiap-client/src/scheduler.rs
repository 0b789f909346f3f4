//! Deferred-expiry scheduler.
//!
//! One explicit instance per client, shared by all of that client's
//! concurrent traps and injectable for tests. Timers are independent
//! lightweight tasks; the scheduler itself holds no state beyond the
//! runtime handle.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Schedules single-shot deferred actions on a tokio runtime.
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// Scheduler on the current runtime. Panics outside a tokio
    /// runtime, like [`Handle::current`].
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Run `action` once, `delay` from now.
    pub fn schedule_once<F>(&self, delay: Duration, action: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(?delay, "scheduling deferred action");
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        ScheduledTask { task }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A scheduled single-shot action that can be aborted before it fires.
#[derive(Debug)]
pub struct ScheduledTask {
    task: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn abort(&self) {
        self.task.abort();
    }
}
