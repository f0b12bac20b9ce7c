//! Core library for FillUp - a mobile app for finding nearby fuel stations.
//!
//! The mobile frontends own the screens and the map widget; this crate owns
//! everything underneath:
//!
//! - authentication and session state (`session::SessionStore`), reconciling
//!   user actions, the identity provider's notifications, and startup
//!   rehydration into one consistent [`session::Session`]
//! - authorization routing (`session::Route`) from the session to the
//!   navigation subtree to mount
//! - the identity provider client, credential vault, and profile document
//!   store (`auth`)
//! - the places client and the client-side station query layer (`api`,
//!   `stations`)
//!
//! Build with the `ts` feature to export the public state types to
//! TypeScript for the frontend bindings.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod session;
pub mod stations;

pub use api::PlacesClient;
pub use auth::{AuthError, AuthProvider, CredentialStore, ProfileStore, RestAuthClient};
pub use config::Config;
pub use models::{FuelStation, UserProfile};
pub use session::{Route, Session, SessionStore};
pub use stations::{SortBy, StationList};
