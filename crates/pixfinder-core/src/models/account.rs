use std::fmt::{Debug, Formatter};

use serde::Serialize;

use crate::models::CoreError;

#[derive(Clone, Eq, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() {
            return Err(CoreError::invalid_input("email must not be empty"));
        }
        if self.password.is_empty() {
            return Err(CoreError::invalid_input("password must not be empty"));
        }
        Ok(())
    }
}

// Keeps passwords out of tracing output.
impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;
    use crate::models::CoreErrorKind;

    #[test]
    fn debug_output_redacts_password() {
        let credentials = Credentials::new("rider@example.com", "hunter2");
        let rendered = format!("{credentials:?}");

        assert!(rendered.contains("rider@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn blank_email_or_password_is_rejected() {
        let error = Credentials::new("   ", "secret").validate().unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);

        let error = Credentials::new("rider@example.com", "").validate().unwrap_err();
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);

        assert!(Credentials::new("rider@example.com", "secret").validate().is_ok());
    }
}
