use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Search entry
// ---------------------------------------------------------------------------

/// One search result, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchEntry {
    Video(Video),
    Channel(Channel),
    Playlist(Playlist),
}

/// The card variant an entry renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Video,
    Channel,
    Playlist,
}

impl EntryKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "video" => Some(Self::Video),
            "channel" => Some(Self::Channel),
            "playlist" => Some(Self::Playlist),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Channel => "channel",
            Self::Playlist => "playlist",
        }
    }
}

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("entry has no \"type\" field")]
    MissingTag,
    #[error("unknown entry type \"{0}\"")]
    UnknownTag(String),
    #[error("malformed {kind} entry: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SearchEntry {
    /// Parse a single entry, checking the tag before deserializing the body.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EntryError> {
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(EntryError::MissingTag)?;
        let kind = EntryKind::from_tag(tag).ok_or_else(|| EntryError::UnknownTag(tag.to_owned()))?;

        serde_json::from_value(value).map_err(|source| EntryError::Malformed {
            kind: kind.label(),
            source,
        })
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Video(_) => EntryKind::Video,
            Self::Channel(_) => EntryKind::Channel,
            Self::Playlist(_) => EntryKind::Playlist,
        }
    }

    /// Stable identity used to key the rendered card.
    pub fn key(&self) -> &str {
        match self {
            Self::Video(v) => &v.video_id,
            Self::Channel(c) => &c.author_id,
            Self::Playlist(p) => &p.playlist_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Video(v) => &v.title,
            Self::Channel(c) => &c.author,
            Self::Playlist(p) => &p.title,
        }
    }

    /// Front-end path the entry links to.
    pub fn watch_path(&self) -> String {
        match self {
            Self::Video(v) => format!("/watch?v={}", v.video_id),
            Self::Channel(c) => format!("/channel/{}", c.author_id),
            Self::Playlist(p) => format!("/playlist?list={}", p.playlist_id),
        }
    }
}

/// Parse a whole page body: a JSON array of entries, or `null`.
///
/// Entries that fail the tag check are left out and returned with their
/// index, so one bad entry does not take the rest of the page with it.
pub fn parse_page(
    values: Option<Vec<serde_json::Value>>,
) -> (Option<Vec<SearchEntry>>, Vec<(usize, EntryError)>) {
    let Some(values) = values else {
        return (None, Vec::new());
    };

    let mut entries = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match SearchEntry::from_value(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => rejected.push((index, e)),
        }
    }
    (Some(entries), rejected)
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub author_verified: bool,
    #[serde(default)]
    pub video_thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "descriptionHTML", default)]
    pub description_html: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub view_count_text: String,
    #[serde(default)]
    pub published: i64,
    #[serde(default)]
    pub published_text: String,
    #[serde(default)]
    pub length_seconds: u64,
    #[serde(default)]
    pub live_now: bool,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub is_upcoming: bool,
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub author_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub author_verified: bool,
    #[serde(default)]
    pub author_thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default)]
    pub sub_count: u64,
    #[serde(default)]
    pub video_count: u64,
    #[serde(default)]
    pub channel_handle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
}

// ---------------------------------------------------------------------------
// Playlist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub playlist_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub playlist_thumbnail: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub author_verified: bool,
    #[serde(default)]
    pub video_count: u64,
    #[serde(default)]
    pub videos: Vec<PlaylistVideo>,
}

/// Lightweight video summary embedded in a playlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    #[serde(default)]
    pub title: String,
    pub video_id: String,
    #[serde(default)]
    pub length_seconds: u64,
    #[serde(default)]
    pub video_thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}
