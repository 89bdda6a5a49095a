use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::errors::PlexError;
use crate::models::{
    ApiResponse, LibrarySection, MetadataPage, PlexMetadata, SectionsPayload, ServerInfo,
};

pub const DEFAULT_HEADERS: [(&str, &str); 4] = [
    ("accept", "application/json"),
    ("x-plex-product", "plex-monitor"),
    ("x-plex-version", env!("CARGO_PKG_VERSION")),
    ("x-plex-client-identifier", "plex-monitor-csv-export"),
];

const PAGE_START_PARAM: &str = "X-Plex-Container-Start";
const PAGE_SIZE_PARAM: &str = "X-Plex-Container-Size";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_PLEX_URL.to_string(),
            token: String::new(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }
}

/// How a fetched page moves a paged listing along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    More,
    Last,
    /// The server ignored the start offset and sent the first page again.
    Repeated,
}

#[derive(Clone)]
pub struct PlexClient {
    client: Client,
    base_url: Url,
    options: ClientOptions,
}

impl PlexClient {
    pub fn new(options: ClientOptions) -> Result<Self, PlexError> {
        let base_url = Url::parse(options.base_url.trim())
            .map_err(|err| PlexError::InvalidUrl(format!("{}: {err}", options.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(PlexError::InvalidUrl(options.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in DEFAULT_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        let mut token = HeaderValue::from_str(&options.token)
            .map_err(|err| PlexError::InvalidToken(err.to_string()))?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-plex-token"), token);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(PlexError::Request)?;

        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    /// Checks the server answers with the configured token.
    pub async fn connect(&self) -> Result<ServerInfo, PlexError> {
        self.request("/", &[]).await
    }

    pub async fn sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        let payload: SectionsPayload = self.request("/library/sections", &[]).await?;
        Ok(payload.directories)
    }

    pub async fn section(&self, name: &str) -> Result<LibrarySection, PlexError> {
        self.sections()
            .await?
            .into_iter()
            .find(|section| section.title == name)
            .ok_or_else(|| PlexError::LibraryNotFound(name.to_string()))
    }

    /// Every item in the section, in server order.
    pub async fn section_items(
        &self,
        section: &LibrarySection,
    ) -> Result<Vec<PlexMetadata>, PlexError> {
        let path = format!("/library/sections/{}/all", section.key);
        let mut items = Vec::new();
        let mut first_key: Option<String> = None;
        loop {
            let page = self.metadata_page(&path, items.len() as u64).await?;
            let step = self.page_step(&page, items.len() as u64, first_key.as_deref());
            if step == PageStep::Repeated {
                warn!(section = %section.title, "server repeated the first page, stopping");
                break;
            }
            if first_key.is_none() {
                first_key = page.metadata.first().map(|item| item.rating_key.clone());
            }
            items.extend(page.metadata);
            if step == PageStep::Last {
                break;
            }
        }
        debug!(section = %section.title, count = items.len(), "fetched section items");
        Ok(items)
    }

    /// Full metadata for one item; listings omit most tags.
    pub async fn metadata(&self, rating_key: &str) -> Result<PlexMetadata, PlexError> {
        let path = format!("/library/metadata/{rating_key}");
        let page: MetadataPage = self
            .request(&path, &[("includeGuids", "1".to_string())])
            .await?;
        page.metadata
            .into_iter()
            .next()
            .ok_or_else(|| PlexError::InvalidJson(format!("no metadata returned for {path}")))
    }

    /// One page of a show's episodes starting at `start`.
    pub async fn episode_page(
        &self,
        show_rating_key: &str,
        start: u64,
    ) -> Result<MetadataPage, PlexError> {
        let path = format!("/library/metadata/{show_rating_key}/allLeaves");
        self.metadata_page(&path, start).await
    }

    /// Classifies `page`, fetched after `already_seen` items of a listing
    /// whose first page started with `first_key`.
    pub fn page_step(
        &self,
        page: &MetadataPage,
        already_seen: u64,
        first_key: Option<&str>,
    ) -> PageStep {
        let page_first = page.metadata.first().map(|item| item.rating_key.as_str());
        if already_seen > 0 && first_key.is_some() && page_first == first_key {
            return PageStep::Repeated;
        }
        let fetched = page.metadata.len() as u64;
        if fetched < u64::from(self.options.page_size)
            || page.total_size.is_some_and(|total| already_seen + fetched >= total)
        {
            PageStep::Last
        } else {
            PageStep::More
        }
    }

    async fn metadata_page(&self, path: &str, start: u64) -> Result<MetadataPage, PlexError> {
        self.request(
            path,
            &[
                ("includeGuids", "1".to_string()),
                (PAGE_START_PARAM, start.to_string()),
                (PAGE_SIZE_PARAM, self.options.page_size.to_string()),
            ],
        )
        .await
    }

    /// Appends `path` to the base URL, keeping any prefix such as `/plex`.
    fn endpoint(&self, path: &str) -> Result<Url, PlexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlexError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PlexError> {
        let url = self.endpoint(path)?;
        let mut req = self.client.get(url.clone());
        for (k, v) in params {
            req = req.query(&[(k, v.as_str())]);
        }
        let response = req.send().await.map_err(PlexError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlexError::Status {
                status,
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(PlexError::Request)?;
        let payload: ApiResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|err| PlexError::InvalidJson(format!("{url}: {err}")))?;
        Ok(payload.media_container)
    }
}
