//! Video records and the raw catalog search payload

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::first_string;

/// Accepted names for a favorite's video id, in priority order.
pub const FAVORITE_ID_FIELDS: &[&str] = &["videoId", "youtubeVideoId", "id"];

/// A catalog video, as stored in the favorites service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Catalog id; unique within the favorites set
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub channel_id: String,
    /// Medium thumbnail, or empty when the catalog had none
    pub thumbnail_url: String,
    /// RFC 3339 timestamp as sent by the catalog
    pub published_at: String,
}

impl Video {
    /// Normalize one favorites record; `None` when no id field is present.
    pub fn from_favorite(value: &Value) -> Option<Self> {
        let video_id = first_string(value, FAVORITE_ID_FIELDS).or_else(|| {
            FAVORITE_ID_FIELDS
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_i64))
                .map(|id| id.to_string())
        })?;

        let text = |field: &str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            video_id,
            title: text("title"),
            description: text("description"),
            channel_title: text("channelTitle"),
            channel_id: text("channelId"),
            thumbnail_url: text("thumbnailUrl"),
            published_at: text("publishedAt"),
        })
    }

    /// Link to the video on YouTube
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Year of publication, if `published_at` parses
    pub fn published_year(&self) -> Option<i32> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|d| d.year())
    }

    /// Case-insensitive match on title or channel; `needle` must already be lowercase
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.channel_title.to_lowercase().contains(needle)
    }
}

/// Response of the catalog `search` endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

impl SearchResult {
    pub fn into_video(self) -> Option<Video> {
        let video_id = self.id.video_id?;
        let snippet = self.snippet;
        Some(Video {
            video_id,
            title: snippet.title,
            description: snippet.description,
            channel_title: snippet.channel_title,
            channel_id: snippet.channel_id,
            thumbnail_url: snippet.thumbnails.medium.map(|t| t.url).unwrap_or_default(),
            published_at: snippet.published_at,
        })
    }
}
