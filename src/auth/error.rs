use thiserror::Error;

/// Fallback sentence for errors with no mapped code and no usable message.
const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Provider error codes mapped to the one sentence shown to the user.
const ERROR_MESSAGES: &[(&str, &str)] = &[
    (
        "auth/invalid-credential",
        "Invalid email or password. Please try again.",
    ),
    (
        "auth/user-not-found",
        "No account found with this email. Please check your email or sign up.",
    ),
    ("auth/wrong-password", "Incorrect password. Please try again."),
    (
        "auth/email-already-in-use",
        "This email is already in use. Please try another email or login instead.",
    ),
    (
        "auth/weak-password",
        "Password is too weak. Please use a stronger password.",
    ),
    (
        "auth/invalid-email",
        "Invalid email format. Please enter a valid email.",
    ),
    (
        "auth/user-disabled",
        "This account has been disabled. Please contact support.",
    ),
    (
        "auth/too-many-requests",
        "Too many failed login attempts. Please try again later or reset your password.",
    ),
    (
        "auth/network-request-failed",
        "Network error. Please check your internet connection and try again.",
    ),
    (
        "auth/requires-recent-login",
        "This action requires recent authentication. Please log in again.",
    ),
    (
        "auth/account-exists-with-different-credential",
        "An account already exists with the same email but different sign-in credentials.",
    ),
    (
        "auth/operation-not-allowed",
        "This operation is not allowed. Please contact support.",
    ),
    (
        "auth/popup-closed-by-user",
        "Sign-in popup was closed before completing the sign-in process.",
    ),
    (
        "auth/unauthorized-domain",
        "This domain is not authorized for OAuth operations.",
    ),
    (
        "auth/invalid-action-code",
        "The action code is invalid. This can happen if the code is malformed or has already been used.",
    ),
];

#[derive(Error, Debug)]
pub enum AuthError {
    /// Structured failure from the identity provider, carrying its code.
    #[error("{message} ({code})")]
    Provider { code: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The provider error code, when one is available.
    ///
    /// Falls back to parsing a parenthesized code out of the message, the
    /// convention used when the provider reports errors as plain strings
    /// like `"Error (auth/invalid-credential)."`.
    pub fn code(&self) -> Option<String> {
        match self {
            AuthError::Provider { code, message } => {
                if !code.is_empty() {
                    Some(code.clone())
                } else {
                    extract_code(message)
                }
            }
            AuthError::Network(_) => Some("auth/network-request-failed".to_string()),
            _ => None,
        }
    }

    /// The fixed user-facing sentence for this error.
    ///
    /// Mapped codes win; an unmapped error passes its raw message through
    /// unless it looks like an internal diagnostic, in which case the
    /// generic sentence is used.
    pub fn user_message(&self) -> String {
        if let Some(code) = self.code() {
            if let Some(msg) = message_for_code(&code) {
                return msg.to_string();
            }
        }

        match self {
            AuthError::Provider { message, .. }
                if !message.is_empty() && !looks_like_diagnostic(message) =>
            {
                message.clone()
            }
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Look up the fixed sentence for a provider error code.
pub fn message_for_code(code: &str) -> Option<&'static str> {
    ERROR_MESSAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, m)| *m)
}

/// Extract an `auth/...` code from a parenthesized segment of a message.
pub fn extract_code(message: &str) -> Option<String> {
    let start = message.find('(')?;
    let rest = &message[start + 1..];
    let end = rest.find(')')?;
    let code = &rest[..end];
    if code.starts_with("auth/") {
        Some(code.to_string())
    } else {
        None
    }
}

/// Internal diagnostic strings are never shown to the user: anything still
/// carrying a parenthesized code, or a bare SCREAMING_CASE wire code.
fn looks_like_diagnostic(message: &str) -> bool {
    if message.contains("(auth/") {
        return true;
    }
    !message.is_empty()
        && message
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == ':' || c == ' ')
}
