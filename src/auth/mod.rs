//! Authentication building blocks: identity provider client, credential
//! vault, profile document store, and form validation.
//!
//! This module provides:
//! - `AuthProvider` / `RestAuthClient`: the identity provider seam and its
//!   REST implementation, including session-change notifications
//! - `CredentialStore` / `SealedFileStore`: the persisted token and cached
//!   profile, encrypted at rest
//! - `ProfileStore`: the user profile document store
//! - `AuthError`: provider failures mapped to fixed user-facing messages

pub mod error;
pub mod profiles;
pub mod provider;
pub mod validation;
pub mod vault;

pub use error::AuthError;
pub use profiles::{MemoryProfileStore, ProfileStore, RestProfileStore};
pub use provider::{AuthProvider, RestAuthClient, SessionRef};
pub use vault::{CredentialStore, MemoryStore, SealedFileStore, PROFILE_KEY, TOKEN_KEY};
