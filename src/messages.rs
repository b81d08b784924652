//! Failure messages shown to the user, per action

use crate::error::Error;

/// The user action a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    RefreshSession,
    Logout,
    LoadFavorites,
    Search,
    ToggleFavorite,
    RemoveFavorite,
}

impl Action {
    fn fallback(self) -> &'static str {
        match self {
            Action::Login => "Could not sign in.",
            Action::Register => "Could not create the account.",
            Action::ForgotPassword => "Could not request the password reset.",
            Action::ResetPassword => "Could not reset the password.",
            Action::RefreshSession => "Could not refresh your session. Please sign in again.",
            Action::Logout => "Could not close the session on the server.",
            Action::LoadFavorites => "Could not load your favorites.",
            Action::Search => "An error occurred while searching videos. Please try again.",
            Action::ToggleFavorite => "Could not update your favorites list.",
            Action::RemoveFavorite => "Could not remove the video from your favorites.",
        }
    }
}

/// Turn a failure into the string shown for `action`.
///
/// Backend messages for the auth screens are rewritten into friendlier text
/// when they match a known pattern. The favorites and search screens always
/// show their own wording unless the failure is local (configuration or
/// validation).
pub fn user_message(action: Action, err: &Error) -> String {
    match err {
        Error::Config(msg) | Error::Validation(msg) => return msg.clone(),
        _ => {}
    }

    match action {
        Action::Login
        | Action::Register
        | Action::ForgotPassword
        | Action::ResetPassword
        | Action::RefreshSession => {
            let msg = err.display_message(action.fallback());
            rewrite_auth_message(action, &msg).unwrap_or(msg)
        }
        _ => action.fallback().to_string(),
    }
}

fn rewrite_auth_message(action: Action, msg: &str) -> Option<String> {
    let lower = msg.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    let duplicate = has("duplicate entry");

    let text = match action {
        Action::Login
            if has("invalid") && (has("credentials") || has("username") || has("password")) =>
        {
            "Incorrect username or password."
        }
        Action::Register if duplicate && (has("username") || has("ux_users_username")) => {
            "That username is taken. Please choose another one."
        }
        Action::Register if duplicate && (has("email") || has("ux_users_email")) => {
            "That email is already registered. Try signing in or use another email."
        }
        Action::ForgotPassword if has("not found") => {
            "We could not find an account with those details."
        }
        Action::ResetPassword if has("invalid") && has("code") => {
            "The code you entered is invalid or has expired."
        }
        _ => return None,
    };
    Some(text.to_string())
}
