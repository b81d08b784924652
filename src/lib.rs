//! InnovaTube Rust Client Library
//!
//! A client for the InnovaTube backend: account management, a session that
//! survives restarts, YouTube search and a personal favorites list, plus the
//! view-models behind the dashboard and favorites screens.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod forms;
pub mod messages;
pub mod routes;
pub mod session;
pub mod videos;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::favorites::FavoritesView;
use crate::fetch::HttpClient;
use crate::session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
use crate::videos::VideosClient;

/// The main entry point for the InnovaTube client
pub struct InnovaTube {
    /// Client options
    pub config: ClientConfig,
    /// Session-aware transport shared by every sub-client
    pub http: HttpClient,
    auth: AuthClient,
    videos: Arc<VideosClient>,
}

impl InnovaTube {
    /// Create a new client.
    ///
    /// The session lives in `config.session_path` when set, in memory
    /// otherwise.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use innovatube_client::{config::ClientConfig, InnovaTube};
    ///
    /// let config = ClientConfig::default().with_api_base_url("http://localhost:5064");
    /// let client = InnovaTube::new(config).unwrap();
    /// assert!(!client.auth().is_authenticated());
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        let session: Arc<dyn SessionStore> = match &config.session_path {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::new_with_session_store(config, session)
    }

    /// Create a new client around an explicit session store
    pub fn new_with_session_store(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let http = HttpClient::new(http_client, &config, session);
        let auth = AuthClient::new(http.clone(), config.requires_captcha());
        let videos = Arc::new(VideosClient::new(http.clone(), &config));

        Ok(Self {
            config,
            http,
            auth,
            videos,
        })
    }

    /// Build a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Get the videos client
    pub fn videos(&self) -> Arc<VideosClient> {
        Arc::clone(&self.videos)
    }

    /// The stored session, if any
    pub fn session(&self) -> Option<Session> {
        self.http.session_store().get()
    }

    /// A fresh dashboard view-model
    pub fn dashboard(&self) -> Dashboard<VideosClient> {
        Dashboard::new(self.videos())
    }

    /// A fresh favorites screen view-model
    pub fn favorites_view(&self) -> FavoritesView<VideosClient> {
        FavoritesView::new(self.videos())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::error::{Error, Result};
    pub use crate::session::{Session, SessionStore};
    pub use crate::videos::{Video, VideoService};
    pub use crate::InnovaTube;
}
