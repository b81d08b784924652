//! Authentication against the InnovaTube backend
//!
//! Login and refresh write the session store; logout always clears it.
//! Everything else is a plain pass-through.

mod types;

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use crate::error::Result;
use crate::fetch::HttpClient;
use crate::forms::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use crate::messages::{user_message, Action};
use crate::session::{Session, SessionStore};

pub use types::*;

const REGISTER_PATH: &str = "/Auth/register";
const LOGIN_PATH: &str = "/Auth/login";
const REFRESH_PATH: &str = "/Auth/refresh";
const FORGOT_PASSWORD_PATH: &str = "/Auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/Auth/reset-password";
const LOGOUT_PATH: &str = "/Auth/logout";

/// Client for the `/Auth` endpoints
#[derive(Clone)]
pub struct AuthClient {
    http: HttpClient,
    requires_captcha: bool,
}

impl AuthClient {
    /// Create a new AuthClient
    pub fn new(http: HttpClient, requires_captcha: bool) -> Self {
        Self {
            http,
            requires_captcha,
        }
    }

    fn store(&self) -> &Arc<dyn SessionStore> {
        self.http.session_store()
    }

    /// Register a new account
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<Value>> {
        self.http.post(REGISTER_PATH).json(request)?.send().await
    }

    /// Sign in with a username or email.
    ///
    /// The session built from the response is persisted before the raw
    /// response is handed back. A response without an access token leaves
    /// the stored session as it was.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Value> {
        let body = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        let data = self
            .http
            .post(LOGIN_PATH)
            .json(&body)?
            .send()
            .await?
            .unwrap_or(Value::Null);

        let session = Session::from_response(&data);
        if !session.is_authenticated() {
            warn!("login response for {identifier} carried no recognizable access token");
            return Ok(data);
        }
        self.store().set(&session)?;
        debug!("session stored for {:?}", session.username);

        Ok(data)
    }

    /// Exchange a refresh token for new tokens and merge them into the stored session
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Value> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let data = self
            .http
            .post(REFRESH_PATH)
            .json(&body)?
            .send()
            .await?
            .unwrap_or(Value::Null);

        let current = self.store().get().unwrap_or_default();
        self.store().set(&current.merged_with_refresh(&data))?;

        Ok(data)
    }

    /// Ask the backend to send password reset instructions
    pub async fn forgot_password(&self, identifier: &str) -> Result<Option<Value>> {
        let body = ForgotPasswordRequest {
            identifier: identifier.to_string(),
        };
        self.http.post(FORGOT_PASSWORD_PATH).json(&body)?.send().await
    }

    /// Set a new password using the emailed code
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<Option<Value>> {
        let body = ResetPasswordRequest {
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.http.post(RESET_PASSWORD_PATH).json(&body)?.send().await
    }

    /// End the backend session.
    ///
    /// The local session is cleared whatever happens to the remote call; the
    /// remote error, if any, is still returned.
    pub async fn logout(&self, session_id: i64) -> Result<()> {
        let remote = self
            .http
            .post(LOGOUT_PATH)
            .param("sessionId", session_id.to_string())
            .send()
            .await;

        let cleared = self.store().clear();
        if let Err(e) = &cleared {
            warn!("could not clear local session: {e}");
        }

        remote?;
        cleared
    }

    /// Log out the current session, logging instead of returning a remote failure
    pub async fn sign_out(&self) {
        let session_id = self
            .store()
            .get()
            .and_then(|s| s.session_id)
            .unwrap_or(0);

        if let Err(e) = self.logout(session_id).await {
            warn!("{} ({e})", user_message(Action::Logout, &e));
        }
    }

    /// Validate the login form, then [`login`](Self::login)
    pub async fn sign_in(&self, form: &LoginForm) -> Result<Value> {
        form.validate(self.requires_captcha)?;
        self.login(form.identifier.trim(), &form.password).await
    }

    /// Validate the registration form, then [`register`](Self::register)
    pub async fn sign_up(&self, form: &RegisterForm) -> Result<Option<Value>> {
        form.validate(self.requires_captcha)?;
        self.register(&form.to_request()).await
    }

    /// Validate the identifier, then [`forgot_password`](Self::forgot_password)
    pub async fn request_password_reset(&self, form: &ForgotPasswordForm) -> Result<Option<Value>> {
        form.validate()?;
        self.forgot_password(form.identifier.trim()).await
    }

    /// Check the confirmation matches, then [`reset_password`](Self::reset_password)
    pub async fn confirm_password_reset(&self, form: &ResetPasswordForm) -> Result<Option<Value>> {
        form.validate()?;
        self.reset_password(form.code.trim(), &form.new_password).await
    }

    /// The stored session, if any
    pub fn current_session(&self) -> Option<Session> {
        self.store().get()
    }

    /// Whether a session with an access token is stored
    pub fn is_authenticated(&self) -> bool {
        self.current_session().map_or(false, |s| s.is_authenticated())
    }
}
