use serde::{Deserialize, Serialize};

/// Every Plex JSON response wraps its payload in a `MediaContainer`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub machine_identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionsPayload {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<LibrarySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub section_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPage {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Movie,
    Show,
    Episode,
    Other,
}

/// A movie, show or episode as returned by the metadata endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadata {
    #[serde(default)]
    pub rating_key: String,
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub studio: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(default)]
    pub last_viewed_at: Option<i64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub parent_index: Option<i32>,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<PlexTag>,
    #[serde(rename = "Director", default)]
    pub directors: Vec<PlexTag>,
    #[serde(rename = "Role", default)]
    pub roles: Vec<PlexTag>,
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PlexGuid>,
}

impl PlexMetadata {
    pub fn kind(&self) -> ItemKind {
        match self.item_type.as_str() {
            "movie" => ItemKind::Movie,
            "show" => ItemKind::Show,
            "episode" => ItemKind::Episode,
            _ => ItemKind::Other,
        }
    }

    /// File paths of every part, in media order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.media
            .iter()
            .flat_map(|media| media.parts.iter())
            .filter_map(|part| part.file.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexTag {
    pub tag: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexGuid {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMedia {
    #[serde(default)]
    pub video_resolution: Option<String>,
    #[serde(rename = "Part", default)]
    pub parts: Vec<PlexPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexPart {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    Movie,
    Episode,
}

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub show_title: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub content_rating: Option<String>,
    pub duration_minutes: Option<i64>,
    pub studio: Option<String>,
    pub summary: Option<String>,
    pub genres: String,
    pub directors: String,
    pub actors: String,
    pub added_at: Option<String>,
    pub last_viewed_at: Option<String>,
    pub view_count: u64,
    pub file_path: String,
    pub file_size_gb: Option<f64>,
    pub video_resolution: String,
    pub imdb_id: Option<String>,
    pub imdb_url: Option<String>,
    pub plex_key: String,
}
