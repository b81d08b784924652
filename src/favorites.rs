//! The favorites list screen

use std::sync::Arc;

use log::error;

use crate::dashboard::Busy;
use crate::error::Error;
use crate::messages::{user_message, Action};
use crate::videos::{Video, VideoService};

pub struct FavoritesView<S> {
    service: Arc<S>,
    favorites: Vec<Video>,
    filter: String,
    error: Option<String>,
    loading: bool,
}

impl<S: VideoService> FavoritesView<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            favorites: Vec::new(),
            filter: String::new(),
            error: None,
            loading: false,
        }
    }

    /// Replace the list with the server's favorites
    pub async fn load(&mut self, search: Option<&str>) -> bool {
        self.error = None;
        let outcome = {
            let _busy = Busy::start(&mut self.loading);
            self.service.list_favorites(search).await
        };

        match outcome {
            Ok(favorites) => {
                self.favorites = favorites;
                true
            }
            Err(e) => {
                self.fail(Action::LoadFavorites, &e);
                false
            }
        }
    }

    /// Reload using the current filter text as the server-side search
    pub async fn refresh(&mut self) -> bool {
        let filter = self.filter.clone();
        self.load(Some(&filter)).await
    }

    /// Delete remotely, then drop it from the list
    pub async fn remove(&mut self, video: &Video) -> bool {
        self.error = None;
        match self.service.delete_favorite(&video.video_id).await {
            Ok(()) => {
                self.favorites.retain(|f| f.video_id != video.video_id);
                true
            }
            Err(e) => {
                self.fail(Action::RemoveFavorite, &e);
                false
            }
        }
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
    }

    /// Local filter on title or channel, ignoring case
    pub fn filtered(&self) -> Vec<&Video> {
        let needle = self.filter.trim().to_lowercase();
        self.favorites
            .iter()
            .filter(|v| needle.is_empty() || v.matches_lowercase(&needle))
            .collect()
    }

    pub fn favorites(&self) -> &[Video] {
        &self.favorites
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn fail(&mut self, action: Action, err: &Error) {
        error!("{:?} failed: {}", action, err);
        self.error = Some(user_message(action, err));
    }
}
