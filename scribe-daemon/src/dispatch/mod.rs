//! Dispatch engine - the idempotency ledger and the poll loop.

pub mod dispatcher;
pub mod state;

pub use dispatcher::Dispatcher;
pub use state::{DispatchState, JsonStateStore, StateStore, task_fingerprint};
