//! Session record and the stores that persist it

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Accepted names for the access token, in priority order.
pub const ACCESS_TOKEN_FIELDS: &[&str] =
    &["accessToken", "token", "jwtToken", "jwt", "bearerToken"];

/// Accepted names for the refresh token.
pub const REFRESH_TOKEN_FIELDS: &[&str] = &["refreshToken"];

/// Accepted names for the backend session id.
pub const SESSION_ID_FIELDS: &[&str] = &["sessionId", "id"];

/// Accepted names for the username.
pub const USERNAME_FIELDS: &[&str] = &["username", "userName"];

/// Accepted names for the email address.
pub const EMAIL_FIELDS: &[&str] = &["email"];

/// The authenticated user's credential and identity snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer credential attached to backend requests
    pub access_token: Option<String>,

    /// Token used to obtain a new access token
    pub refresh_token: Option<String>,

    /// Backend session id, needed for logout
    pub session_id: Option<i64>,

    /// The username
    pub username: Option<String>,

    /// The email address
    pub email: Option<String>,
}

impl Session {
    /// Build a session from a login response (or a stored record), whatever
    /// naming convention the backend used for each field.
    pub fn from_response(value: &Value) -> Self {
        Self {
            access_token: first_string(value, ACCESS_TOKEN_FIELDS),
            refresh_token: first_string(value, REFRESH_TOKEN_FIELDS),
            session_id: first_i64(value, SESSION_ID_FIELDS),
            username: first_string(value, USERNAME_FIELDS),
            email: first_string(value, EMAIL_FIELDS),
        }
    }

    /// Apply a refresh response on top of this session.
    ///
    /// Only the tokens are taken from the response; everything it does not
    /// carry is kept.
    pub fn merged_with_refresh(&self, value: &Value) -> Self {
        let mut merged = self.clone();
        if let Some(token) = first_string(value, ACCESS_TOKEN_FIELDS) {
            merged.access_token = Some(token);
        }
        if let Some(token) = first_string(value, REFRESH_TOKEN_FIELDS) {
            merged.refresh_token = Some(token);
        }
        merged
    }

    /// The bearer token, if one is present and non-empty
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the session carries a usable access token
    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

/// First non-empty string among `fields`, in order.
pub(crate) fn first_string(value: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| value.get(*field))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First integer among `fields`; numeric strings count too.
pub(crate) fn first_i64(value: &Value, fields: &[&str]) -> Option<i64> {
    fields
        .iter()
        .filter_map(|field| value.get(*field))
        .find_map(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

/// Holds at most one session. Last write wins.
pub trait SessionStore: Send + Sync {
    /// The current session; `None` when absent or unreadable
    fn get(&self) -> Option<Session>;

    /// Replace the current session
    fn set(&self, session: &Session) -> Result<()>;

    /// Drop the current session; clearing an empty store is fine
    fn clear(&self) -> Result<()>;
}

/// Session kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a session already in place
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        let current = self.session.read().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }

    fn set(&self, session: &Session) -> Result<()> {
        let mut current = self.session.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut current = self.session.write().unwrap_or_else(|e| e.into_inner());
        *current = None;
        Ok(())
    }
}

/// Session persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("could not read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.is_object() => Some(Session::from_response(&value)),
            Ok(_) => None,
            Err(e) => {
                debug!("ignoring unreadable session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
