//! # Flarebar Engine
//!
//! The refresh orchestrator and the application state it owns.
//!
//! All state mutation flows through a single [`Orchestrator`], which
//! publishes [`AppState`] snapshots through a [`StateContainer`] (a tokio
//! watch channel). Any presentation layer — CLI, menu bar, web — subscribes
//! to snapshots and reads; nothing else writes.
//!
//! Refreshes fan out per-resource fetches in parallel, tolerate partial
//! failures by keeping the previous value, and honor cooperative
//! cancellation: a superseding request (account switch, profile switch,
//! manual refresh) cancels the in-flight refresh, which then exits without
//! committing anything further.

pub mod activity;
pub mod notify;
pub mod orchestrator;
pub mod state;
pub mod transitions;

pub use notify::LogNotifier;
pub use orchestrator::{AutoRefreshHandle, Orchestrator};
pub use state::{AppState, ResourceKind, StateContainer, Tab};
pub use transitions::{DeploymentTracker, DeploymentTransition};
