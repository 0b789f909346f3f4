//! FIAP application client.
//!
//! [`FiapClient`] drives the two protocol interaction styles against a
//! remote storage endpoint: pull (`fetch`, paginated via server-issued
//! cursors) and push (`trap`, a time-bounded subscription received at a
//! temporary inbound listener).

pub mod client;
pub mod error;
pub mod scheduler;
pub mod store;

pub use client::{FetchPolicy, FiapClient, TrapPolicy, TrapWait};
pub use error::{ClientError, ClientResult};
pub use scheduler::{ScheduledTask, Scheduler};
pub use store::{PointMapStore, PointQueue, PointStore, TrapStore};
