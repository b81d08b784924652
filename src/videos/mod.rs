//! Catalog search and the favorites endpoints

mod search;
mod types;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, SEARCH_MAX_RESULTS};
use crate::error::{Error, Result};
use crate::fetch::{read_response, HttpClient};

pub use search::LatestSearch;
pub use types::{Video, FAVORITE_ID_FIELDS};

use types::SearchListResponse;

const FAVORITES_PATH: &str = "/Videos/favorites";

/// Client for catalog search and the `/Videos/favorites` endpoints
#[derive(Clone)]
pub struct VideosClient {
    http: HttpClient,
    youtube_api_key: Option<String>,
    youtube_search_url: String,
}

impl VideosClient {
    /// Create a new VideosClient
    pub fn new(http: HttpClient, config: &ClientConfig) -> Self {
        Self {
            http,
            youtube_api_key: config.youtube_api_key.clone(),
            youtube_search_url: config.youtube_search_url.clone(),
        }
    }

    /// Search the external catalog, keeping its ordering.
    ///
    /// Fails with [`Error::Config`] before any request when no API key is set.
    /// No bearer token is sent to the catalog.
    pub async fn search_youtube(&self, query: &str) -> Result<Vec<Video>> {
        let key = self
            .youtube_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("YOUTUBE_API_KEY is not set"))?;

        let mut url = Url::parse(&self.youtube_search_url)?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("part", "snippet")
            .append_pair("q", query)
            .append_pair("type", "video")
            .append_pair("maxResults", &SEARCH_MAX_RESULTS.to_string());
        debug!("GET {} q={:?}", self.youtube_search_url, query);

        let response = self.http.inner().get(url).send().await?;
        let body = read_response(response).await?;

        let parsed = match body {
            None | Some(Value::Null) => SearchListResponse::default(),
            Some(value) => serde_json::from_value::<SearchListResponse>(value)?,
        };

        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| item.into_video())
            .collect())
    }

    /// The signed-in user's favorites, optionally filtered server-side
    pub async fn get_favorites(&self, search: Option<&str>) -> Result<Vec<Video>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let body = self
            .http
            .get(FAVORITES_PATH)
            .param("search", search.map(str::to_string))
            .send()
            .await?;

        let records = match body {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(other) => serde_json::from_value::<Vec<Value>>(other)?,
        };

        Ok(records
            .iter()
            .filter_map(|record| {
                let video = Video::from_favorite(record);
                if video.is_none() {
                    warn!("skipping favorite without a video id: {record}");
                }
                video
            })
            .collect())
    }

    /// Save a video to the favorites
    pub async fn add_favorite(&self, video: &Video) -> Result<Option<Value>> {
        self.http.post(FAVORITES_PATH).json(video)?.send().await
    }

    /// Remove a video from the favorites by id
    pub async fn remove_favorite(&self, video_id: &str) -> Result<Option<Value>> {
        let path = format!("{}/{}", FAVORITES_PATH, urlencoding::encode(video_id));
        self.http.delete(&path).send().await
    }
}

/// The video operations the view-models depend on
#[async_trait]
pub trait VideoService: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Video>>;

    async fn list_favorites(&self, search: Option<&str>) -> Result<Vec<Video>>;

    async fn save_favorite(&self, video: &Video) -> Result<()>;

    async fn delete_favorite(&self, video_id: &str) -> Result<()>;
}

#[async_trait]
impl VideoService for VideosClient {
    async fn search(&self, query: &str) -> Result<Vec<Video>> {
        self.search_youtube(query).await
    }

    async fn list_favorites(&self, search: Option<&str>) -> Result<Vec<Video>> {
        self.get_favorites(search).await
    }

    async fn save_favorite(&self, video: &Video) -> Result<()> {
        self.add_favorite(video).await.map(|_| ())
    }

    async fn delete_favorite(&self, video_id: &str) -> Result<()> {
        self.remove_favorite(video_id).await.map(|_| ())
    }
}
