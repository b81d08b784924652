//! Input checked locally before anything is sent

use crate::auth::RegisterRequest;
use crate::error::{Error, Result};

/// Login screen input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    /// Token produced by the bot-verification widget
    pub captcha_token: Option<String>,
}

impl LoginForm {
    pub fn validate(&self, requires_captcha: bool) -> Result<()> {
        require(&self.identifier, "Enter your username or email.")?;
        require(&self.password, "Enter your password.")?;
        if requires_captcha {
            require_captcha(&self.captcha_token, "Please complete the captcha before signing in.")?;
        }
        Ok(())
    }
}

/// Registration screen input
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub captcha_token: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self, requires_captcha: bool) -> Result<()> {
        require(&self.first_name, "Enter your first name.")?;
        require(&self.last_name, "Enter your last name.")?;
        require(&self.username, "Choose a username.")?;
        require(&self.email, "Enter your email.")?;
        if !self.email.contains('@') {
            return Err(Error::validation("Enter a valid email address."));
        }
        require(&self.password, "Choose a password.")?;
        if requires_captcha {
            require_captcha(&self.captcha_token, "Please complete the captcha before signing up.")?;
        }
        Ok(())
    }

    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Forgot-password screen input
#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub identifier: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<()> {
        require(&self.identifier, "Enter your username or email.")
    }
}

/// Reset-password screen input
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<()> {
        require(&self.code, "Enter the code you received.")?;
        require(&self.new_password, "Enter a new password.")?;
        if self.new_password != self.confirm_password {
            return Err(Error::validation("Passwords do not match."));
        }
        Ok(())
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(message))
    } else {
        Ok(())
    }
}

fn require_captcha(token: &Option<String>, message: &str) -> Result<()> {
    match token.as_deref() {
        Some(t) if !t.trim().is_empty() => Ok(()),
        _ => Err(Error::validation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> LoginForm {
        LoginForm {
            identifier: "alice".into(),
            password: "secret".into(),
            captcha_token: None,
        }
    }

    #[test]
    fn login_requires_captcha_only_when_configured() {
        assert!(login().validate(false).is_ok());
        assert!(matches!(login().validate(true), Err(Error::Validation(_))));

        let form = LoginForm {
            captcha_token: Some("tok".into()),
            ..login()
        };
        assert!(form.validate(true).is_ok());
    }

    #[test]
    fn login_rejects_blank_fields() {
        let form = LoginForm {
            password: "   ".into(),
            ..login()
        };
        assert!(form.validate(false).is_err());
    }

    #[test]
    fn reset_password_mismatch() {
        let form = ResetPasswordForm {
            code: "123".into(),
            new_password: "a".into(),
            confirm_password: "b".into(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[test]
    fn register_checks_email_shape_and_trims() {
        let form = RegisterForm {
            first_name: " Alice ".into(),
            last_name: "Liddell".into(),
            username: "alice".into(),
            email: "alice.example.com".into(),
            password: "secret".into(),
            captcha_token: None,
        };
        assert!(form.validate(false).is_err());

        let form = RegisterForm {
            email: "alice@example.com".into(),
            ..form
        };
        assert!(form.validate(false).is_ok());
        assert_eq!(form.to_request().first_name, "Alice");
    }
}
