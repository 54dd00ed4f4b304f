use crate::models::ServiceError;
use lazy_static::lazy_static;
use regex::Regex;

pub mod database;
pub mod integrity;
pub mod latency;
pub mod seed;

pub use database::{Database, DatabaseProvider, SharedDatabase};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles");
}

// Request validation helpers shared by the route modules
pub mod validate {
    use super::*;

    pub fn email(email: &str) -> Result<(), ServiceError> {
        if EMAIL_RE.is_match(email.trim()) {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!("Invalid email address: {}", email)))
        }
    }

    pub fn non_blank(field: &str, value: &str) -> Result<(), ServiceError> {
        if value.trim().is_empty() {
            return Err(ServiceError::BadRequest(format!("'{}' must not be empty", field)));
        }
        Ok(())
    }

    pub fn progress(progress: u8) -> Result<(), ServiceError> {
        if progress > 100 {
            return Err(ServiceError::BadRequest(format!(
                "Progress must be between 0 and 100, got {}",
                progress
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validate;

    #[test]
    fn email_validation() {
        assert!(validate::email("dev@example.com").is_ok());
        assert!(validate::email("  dev@example.com ").is_ok());
        assert!(validate::email("dev@example").is_err());
        assert!(validate::email("not an email").is_err());
    }

    #[test]
    fn progress_bounds() {
        assert!(validate::progress(0).is_ok());
        assert!(validate::progress(100).is_ok());
        assert!(validate::progress(101).is_err());
    }

    #[test]
    fn blank_fields_rejected() {
        assert!(validate::non_blank("title", "   ").is_err());
        assert!(validate::non_blank("title", "Plan sprint").is_ok());
    }
}
