//! User profile types shared by the session layer and the profile document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile issued by the identity provider and stored in the user document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AccountProfile {
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Minimal profile delivered by a social (OAuth) sign-in.
/// The OAuth exchange happens upstream; only the claims survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SocialProfile {
    pub email: String,
    pub name: String,
    pub picture: String,
}

/// The two shapes a signed-in user can take.
///
/// Consumers match on the variant instead of probing individual fields;
/// `display_name` covers the one capability both shapes share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum UserProfile {
    Account(AccountProfile),
    Social(SocialProfile),
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match self {
            UserProfile::Account(p) => p.full_name(),
            UserProfile::Social(p) => p.name.clone(),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            UserProfile::Account(p) => &p.email,
            UserProfile::Social(p) => &p.email,
        }
    }
}

/// Fields collected by the sign-up form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegistrationData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub password: String,
}
