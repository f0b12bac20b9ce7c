//! Session state management and authorization routing.
//!
//! This module provides:
//! - `Session`: the process-wide authentication/authorization snapshot
//! - `SessionStore`: the store that reconciles user actions, provider
//!   notifications, and startup rehydration into one consistent session
//! - `Route`: the pure session-to-navigation-subtree mapping

pub mod router;
pub mod store;

pub use router::{container_key, Route};
pub use store::{Session, SessionStore};
