//! Screens and the signed-in guard

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    NotFound,
}

impl Screen {
    pub fn from_path(path: &str) -> Self {
        let path = path.split(|c| c == '?' || c == '#').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Screen::Dashboard,
            "/login" => Screen::Login,
            "/register" => Screen::Register,
            "/forgot-password" => Screen::ForgotPassword,
            "/reset-password" => Screen::ResetPassword,
            _ => Screen::NotFound,
        }
    }

    pub fn path(self) -> Option<&'static str> {
        match self {
            Screen::Login => Some("/login"),
            Screen::Register => Some("/register"),
            Screen::ForgotPassword => Some("/forgot-password"),
            Screen::ResetPassword => Some("/reset-password"),
            Screen::Dashboard => Some("/"),
            Screen::NotFound => None,
        }
    }

    /// Whether the screen needs a signed-in session
    pub fn is_protected(self) -> bool {
        matches!(self, Screen::Dashboard)
    }
}

/// Outcome of resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub screen: Screen,
    /// Where to go back after signing in, when the guard redirected
    pub return_to: Option<String>,
}

/// Pick the screen for `path`, sending unauthenticated visitors of protected
/// screens to the login screen.
pub fn resolve(path: &str, session: Option<&Session>) -> Navigation {
    let screen = Screen::from_path(path);
    let signed_in = session.map_or(false, Session::is_authenticated);

    if screen.is_protected() && !signed_in {
        return Navigation {
            screen: Screen::Login,
            return_to: Some(path.to_string()),
        };
    }

    Navigation {
        screen,
        return_to: None,
    }
}

/// Where a successful login lands
pub fn after_login(return_to: Option<&str>) -> &str {
    return_to.filter(|p| !p.is_empty()).unwrap_or("/")
}
