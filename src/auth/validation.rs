//! Client-side form validation.
//!
//! These checks run before any network call; failures are surfaced inline on
//! the initiating screen and never reach the session store.

/// Characters accepted as the "special character" password requirement.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Per-rule results of the composed password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChecks {
    pub has_letter: bool,
    pub has_number: bool,
    pub has_special_char: bool,
    pub has_min_length: bool,
}

impl PasswordChecks {
    pub fn all_satisfied(&self) -> bool {
        self.has_letter && self.has_number && self.has_special_char && self.has_min_length
    }
}

pub fn validate_password(password: &str) -> PasswordChecks {
    PasswordChecks {
        has_letter: password.chars().any(|c| c.is_ascii_alphabetic()),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_special_char: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        has_min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
    }
}

pub fn is_valid_password(password: &str) -> bool {
    validate_password(password).all_satisfied()
}

/// Accepts `local@domain.tld` with non-empty parts and no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(i) => i > 0 && i + 1 < domain.len(),
        None => false,
    }
}

/// Optional leading `+`, then 10-15 digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (10..=15).contains(&digits.len())
}

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

/// Inline message for a single form field, `None` when the value is valid.
pub fn field_error(field: &str, value: &str) -> Option<String> {
    match field {
        "email" => {
            if value.is_empty() {
                Some("Email is required".to_string())
            } else if !is_valid_email(value) {
                Some("Please enter a valid email address".to_string())
            } else {
                None
            }
        }
        "password" => {
            if value.is_empty() {
                return Some("Password is required".to_string());
            }
            let checks = validate_password(value);
            if !checks.has_letter {
                Some("Password must contain at least one letter".to_string())
            } else if !checks.has_number {
                Some("Password must contain at least one number".to_string())
            } else if !checks.has_special_char {
                Some("Password must contain at least one special character".to_string())
            } else if !checks.has_min_length {
                Some("Password must be at least 8 characters long".to_string())
            } else {
                None
            }
        }
        "mobile_number" => {
            if value.is_empty() {
                Some("Phone number is required".to_string())
            } else if !is_valid_phone_number(value) {
                Some("Please enter a valid phone number".to_string())
            } else {
                None
            }
        }
        "first_name" | "last_name" => {
            let label = if field == "first_name" { "First" } else { "Last" };
            if value.is_empty() {
                Some(format!("{} name is required", label))
            } else if !is_valid_name(value) {
                Some(format!("{} name must be at least 2 characters", label))
            } else {
                None
            }
        }
        _ => {
            if value.is_empty() {
                Some(format!("{} is required", field))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_partial() {
        let checks = validate_password("abc");
        assert!(checks.has_letter);
        assert!(!checks.has_number);
        assert!(!checks.has_special_char);
        assert!(!checks.has_min_length);
        assert!(!checks.all_satisfied());
    }

    #[test]
    fn test_validate_password_full() {
        let checks = validate_password("Abcdef1!");
        assert!(checks.has_letter);
        assert!(checks.has_number);
        assert!(checks.has_special_char);
        assert!(checks.has_min_length);
        assert!(is_valid_password("Abcdef1!"));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.org"));

        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@@b.co"));
    }

    #[test]
    fn test_is_valid_phone_number() {
        assert!(is_valid_phone_number("+2348012345678"));
        assert!(is_valid_phone_number("08012345678"));
        assert!(!is_valid_phone_number("123"));
        assert!(!is_valid_phone_number("+123-456-7890"));
        assert!(!is_valid_phone_number("12345678901234567"));
    }

    #[test]
    fn test_field_error_messages() {
        assert_eq!(field_error("email", "a@b.co"), None);
        assert_eq!(
            field_error("email", "nope").as_deref(),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            field_error("password", "abcdefgh").as_deref(),
            Some("Password must contain at least one number")
        );
        assert_eq!(
            field_error("first_name", "A").as_deref(),
            Some("First name must be at least 2 characters")
        );
        assert_eq!(field_error("last_name", "Lovelace"), None);
    }
}
