//! Dashboard state: search results reconciled against the favorites set
//!
//! The favorites held here are a best-effort copy of the server's list. They
//! change only after the matching remote call succeeded and are fully
//! replaced by [`Dashboard::refresh_favorites`]; nothing keeps them in sync
//! otherwise.

use std::sync::Arc;

use log::{debug, error};
use rand::seq::SliceRandom;

use crate::error::Error;
use crate::messages::{user_message, Action};
use crate::videos::{LatestSearch, Video, VideoService};

/// A category chip; selecting one runs its query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    /// Empty for the "All" chip
    pub query: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { label: "All", query: "" },
    Category { label: "Games", query: "video games" },
    Category { label: "Football", query: "football" },
    Category { label: "Technology", query: "technology" },
    Category { label: "Cooking", query: "cooking recipes" },
];

impl Category {
    /// Look a category up by label, ignoring case
    pub fn by_label(label: &str) -> Option<Category> {
        CATEGORIES
            .iter()
            .copied()
            .find(|c| c.label.eq_ignore_ascii_case(label.trim()))
    }

    pub fn is_all(&self) -> bool {
        self.query.is_empty()
    }
}

/// What a successful toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

/// Holds a loading flag up until dropped, so an abandoned call clears it too
pub(crate) struct Busy<'a>(&'a mut bool);

impl<'a> Busy<'a> {
    pub(crate) fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Busy(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct Dashboard<S> {
    service: Arc<S>,
    searcher: LatestSearch,
    query: String,
    results: Vec<Video>,
    favorites: Vec<Video>,
    shuffled_favorites: Vec<Video>,
    favorites_filter: String,
    active_category: Category,
    error: Option<String>,
    loading_search: bool,
    loading_favorites: bool,
}

impl<S: VideoService + 'static> Dashboard<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            searcher: LatestSearch::new(),
            query: String::new(),
            results: Vec::new(),
            favorites: Vec::new(),
            shuffled_favorites: Vec::new(),
            favorites_filter: String::new(),
            active_category: CATEGORIES[0],
            error: None,
            loading_search: false,
            loading_favorites: false,
        }
    }

    /// A dashboard with the favorites already loaded.
    ///
    /// Fails with the load error message, so nothing runs against an empty
    /// favorites set that does not match the server.
    pub async fn open(service: Arc<S>) -> std::result::Result<Self, String> {
        let mut dashboard = Self::new(service);
        if dashboard.load_favorites(None).await {
            Ok(dashboard)
        } else {
            Err(dashboard.error.take().unwrap_or_default())
        }
    }

    /// Replace the favorites with the server's list.
    ///
    /// On failure the previous list stays and an error is shown.
    pub async fn load_favorites(&mut self, search: Option<&str>) -> bool {
        self.error = None;
        let outcome = {
            let _busy = Busy::start(&mut self.loading_favorites);
            self.service.list_favorites(search).await
        };

        match outcome {
            Ok(favorites) => {
                self.set_favorites(favorites);
                true
            }
            Err(e) => {
                self.fail(Action::LoadFavorites, &e);
                false
            }
        }
    }

    /// Reload from the server using the current filter text
    pub async fn refresh_favorites(&mut self) -> bool {
        let filter = self.favorites_filter.clone();
        self.load_favorites(Some(&filter)).await
    }

    /// Search the catalog and replace the results.
    ///
    /// Blank input does nothing. A search overtaken by a newer one leaves the
    /// state alone.
    pub async fn search(&mut self, term: &str) -> bool {
        let text = term.trim().to_string();
        if text.is_empty() {
            return false;
        }

        self.error = None;
        let service = Arc::clone(&self.service);
        let query = text.clone();
        let outcome = {
            let _busy = Busy::start(&mut self.loading_search);
            self.searcher
                .run(async move { service.search(&query).await })
                .await
        };

        match outcome {
            Ok(results) => {
                debug!("{} result(s) for {:?}", results.len(), text);
                self.results = results;
                true
            }
            Err(Error::Superseded) => {
                debug!("search for {:?} was superseded", text);
                false
            }
            Err(e) => {
                self.fail(Action::Search, &e);
                false
            }
        }
    }

    /// Set the query text and search for it
    pub async fn submit_query(&mut self, query: &str) -> bool {
        self.query = query.to_string();
        let query = self.query.clone();
        self.search(&query).await
    }

    /// Activate a category chip.
    ///
    /// "All" clears the results so the feed falls back to favorites; any other
    /// chip shows its label in the query box and searches its query.
    pub async fn select_category(&mut self, category: Category) -> bool {
        self.active_category = category;
        if category.is_all() {
            self.searcher.cancel();
            self.results.clear();
            return true;
        }
        self.query = category.label.to_string();
        self.search(category.query).await
    }

    /// Linear scan; fine for personal favorites lists.
    pub fn is_favorite(&self, video_id: &str) -> bool {
        self.favorites.iter().any(|f| f.video_id == video_id)
    }

    /// Add the video if absent, remove it if present.
    ///
    /// The remote call completes before the local list changes; a failure
    /// leaves the list untouched and shows an error. No retry.
    pub async fn toggle_favorite(&mut self, video: &Video) -> Option<FavoriteChange> {
        self.error = None;

        if self.is_favorite(&video.video_id) {
            if let Err(e) = self.service.delete_favorite(&video.video_id).await {
                self.fail(Action::ToggleFavorite, &e);
                return None;
            }
            let mut favorites = std::mem::take(&mut self.favorites);
            favorites.retain(|f| f.video_id != video.video_id);
            self.set_favorites(favorites);
            Some(FavoriteChange::Removed)
        } else {
            if let Err(e) = self.service.save_favorite(video).await {
                self.fail(Action::ToggleFavorite, &e);
                return None;
            }
            let mut favorites = std::mem::take(&mut self.favorites);
            favorites.push(video.clone());
            self.set_favorites(favorites);
            Some(FavoriteChange::Added)
        }
    }

    /// Filter the favorites panel by title or channel
    pub fn set_favorites_filter(&mut self, text: &str) {
        self.favorites_filter = text.to_string();
    }

    /// Favorites whose title or channel contains the filter text, ignoring case
    pub fn filtered_favorites(&self) -> Vec<&Video> {
        let needle = self.favorites_filter.trim().to_lowercase();
        self.favorites
            .iter()
            .filter(|v| needle.is_empty() || v.matches_lowercase(&needle))
            .collect()
    }

    /// The main list: search results, or shuffled favorites when there are none
    pub fn feed(&self) -> &[Video] {
        if self.results.is_empty() {
            &self.shuffled_favorites
        } else {
            &self.results
        }
    }

    /// Caption above the feed
    pub fn results_subtitle(&self) -> String {
        if !self.results.is_empty() {
            format!("{} search result(s)", self.results.len())
        } else if !self.favorites.is_empty() {
            "Based on your favorite videos".to_string()
        } else {
            "Search for something to get started".to_string()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Video] {
        &self.results
    }

    pub fn favorites(&self) -> &[Video] {
        &self.favorites
    }

    pub fn active_category(&self) -> Category {
        self.active_category
    }

    /// Message from the last failed action, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.loading_search
    }

    pub fn is_loading_favorites(&self) -> bool {
        self.loading_favorites
    }

    fn set_favorites(&mut self, favorites: Vec<Video>) {
        let mut shuffled = favorites.clone();
        shuffled.shuffle(&mut rand::thread_rng());
        self.favorites = favorites;
        self.shuffled_favorites = shuffled;
    }

    fn fail(&mut self, action: Action, err: &Error) {
        error!("{:?} failed: {}", action, err);
        self.error = Some(user_message(action, err));
    }
}
