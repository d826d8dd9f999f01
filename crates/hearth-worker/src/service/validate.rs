use crate::error::{ServiceError, ServiceResult};

pub const USERNAME_MAX: usize = 30;
pub const NAME_MAX: usize = 100;
pub const BIO_MAX: usize = 800;
pub const POST_MAX: usize = 800;
pub const EVENT_TITLE_MAX: usize = 120;
pub const JOB_TITLE_MAX: usize = 200;
pub const PAY_MAX: usize = 100;
pub const PHONE_MAX: usize = 20;

/// Non-blank text of at most `max` characters. Returns the trimmed value.
pub fn required(field: &str, value: &str, max: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field}: This field may not be blank.")));
    }
    at_most(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

pub fn at_most(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    if value.chars().count() > max {
        return Err(ServiceError::validation(format!(
            "{field}: Ensure this field has no more than {max} characters."
        )));
    }
    Ok(())
}

/// Letters, digits and `@.+-_`, up to 30 characters.
pub fn username(value: &str) -> ServiceResult<String> {
    let value = required("username", value, USERNAME_MAX)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(ServiceError::validation(
            "username: Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(value)
}

pub fn email(value: &str) -> ServiceResult<String> {
    let value = required("email", value, 254)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => {
            Ok(value.to_lowercase())
        }
        _ => Err(ServiceError::validation("email: Enter a valid email address.")),
    }
}

/// Optional free text; blank input is stored as `None`.
pub fn optional(field: &str, value: Option<&str>, max: usize) -> ServiceResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => {
            at_most(field, v, max)?;
            Ok(Some(v.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_bounds() {
        assert_eq!(required("title", "  Launch  ", 10).unwrap(), "Launch");
        assert!(required("title", "   ", 10).is_err());
        assert!(required("title", "abcdefghijk", 10).is_err());
        // Characters, not bytes.
        assert!(required("title", "ééééé", 5).is_ok());
    }

    #[test]
    fn usernames() {
        assert_eq!(username("alice.b+1@x").unwrap(), "alice.b+1@x");
        assert!(username("has space").is_err());
        assert!(username("").is_err());
        assert!(username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn emails() {
        assert_eq!(email("Alice@Example.com").unwrap(), "alice@example.com");
        assert!(email("alice").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("alice@localhost").is_err());
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional("pay", Some("  "), 5).unwrap(), None);
        assert_eq!(optional("pay", None, 5).unwrap(), None);
        assert_eq!(optional("pay", Some("$10"), 5).unwrap(), Some("$10".to_string()));
        assert!(optional("pay", Some("$1000000"), 5).is_err());
    }
}
