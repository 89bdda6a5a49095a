use std::path::{Path, PathBuf};

use tokio::runtime::Builder;
use tracing::{debug, error, info, warn};

use crate::client::{ClientOptions, PageStep, PlexClient};
use crate::config::MonitorConfig;
use crate::csv_utils::{
    encode_records, latest_csv_filename, render_csv_filename, replace_file, write_snapshot,
};
use crate::errors::{ExportError, PlexError, SetupError};
use crate::models::{ItemKind, LibraryRecord, PlexMetadata};
use crate::records::{episode_record, movie_record};
use crate::timestamp::current_timestamp;

/// Per-run adjustments layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub libraries: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LibraryExport {
    pub library: String,
    pub record_count: usize,
    pub timestamp: String,
    /// `None` when the library produced no records.
    pub csv_path: Option<PathBuf>,
    pub latest_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct LibraryOutcome {
    pub library: String,
    pub result: Result<LibraryExport, ExportError>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<LibraryOutcome>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn total_records(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|export| export.record_count)
            .sum()
    }
}

pub fn client_options(config: &MonitorConfig) -> ClientOptions {
    ClientOptions {
        base_url: config.plex_url.clone(),
        token: config.plex_token.clone(),
        timeout: config.timeout(),
        page_size: config.page_size,
    }
}

/// Loads the config, connects and exports every configured library.
pub async fn run(
    config_path: &Path,
    overrides: RunOverrides,
) -> Result<BatchSummary, SetupError> {
    let mut config = MonitorConfig::load(config_path)?;
    if let Some(libraries) = overrides.libraries {
        config.libraries = libraries;
    }
    if let Some(output_dir) = overrides.output_dir {
        config.output_dir = output_dir.to_string_lossy().into_owned();
    }

    info!(url = %config.plex_url, "connecting to Plex server");
    let client = PlexClient::new(client_options(&config)).map_err(SetupError::Connection)?;
    let server = client.connect().await.map_err(|err| {
        error!("failed to connect to Plex: {err}");
        SetupError::Connection(err)
    })?;
    info!(
        server = %server.friendly_name,
        version = %server.version,
        "connected to Plex server"
    );

    let output_dir = config.output_dir_path();
    std::fs::create_dir_all(&output_dir).map_err(|source| SetupError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    Ok(export_all(&client, &config).await)
}

pub fn run_blocking(
    config_path: &Path,
    overrides: RunOverrides,
) -> Result<BatchSummary, SetupError> {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SetupError::Runtime)?;
    rt.block_on(run(config_path, overrides))
}

/// Exports each configured library in order; one library failing does not stop the rest.
pub async fn export_all(client: &PlexClient, config: &MonitorConfig) -> BatchSummary {
    info!(count = config.libraries.len(), "starting monitoring");
    let mut summary = BatchSummary::default();
    for library in &config.libraries {
        let result = export_library(client, config, library, None).await;
        if let Err(err) = &result {
            error!(library = %library, "failed to monitor library: {err}");
        }
        summary.outcomes.push(LibraryOutcome {
            library: library.clone(),
            result,
        });
    }
    info!(
        processed = summary.processed(),
        failed = summary.failed(),
        records = summary.total_records(),
        "monitoring complete"
    );
    summary
}

/// Writes the timestamped and latest CSV for one library.
///
/// `timestamp` replaces the `{date}` value; the current local time is used
/// when it is `None`.
pub async fn export_library(
    client: &PlexClient,
    config: &MonitorConfig,
    library: &str,
    timestamp: Option<String>,
) -> Result<LibraryExport, ExportError> {
    info!(library = %library, "monitoring library");
    let records = collect_library_records(client, library)
        .await
        .map_err(|err| ExportError::from(err).context(format!("library {library}")))?;

    let timestamp = timestamp.unwrap_or_else(current_timestamp);
    let output_dir = config.output_dir_path();
    let mut export = LibraryExport {
        library: library.to_string(),
        record_count: records.len(),
        timestamp,
        csv_path: None,
        latest_path: None,
    };

    if records.is_empty() {
        warn!(library = %library, "no items found in library");
        return Ok(export);
    }

    let contents = encode_records(&records)?;
    let filename = render_csv_filename(&config.csv_filename, library, &export.timestamp);
    let csv_path = write_snapshot(&output_dir.join(filename), &contents)?;
    info!(count = records.len(), path = %csv_path.display(), "exported items");

    let latest_path = replace_file(&output_dir.join(latest_csv_filename(library)), &contents)?;
    info!(path = %latest_path.display(), "updated latest file");

    export.csv_path = Some(csv_path);
    export.latest_path = Some(latest_path);
    Ok(export)
}

pub async fn collect_library_records(
    client: &PlexClient,
    library: &str,
) -> Result<Vec<LibraryRecord>, PlexError> {
    let section = client.section(library).await?;
    let items = client.section_items(&section).await?;

    let mut records = Vec::new();
    for item in items {
        match item.kind() {
            ItemKind::Movie => {
                let movie = client.metadata(&item.rating_key).await?;
                records.push(movie_record(&movie));
            }
            ItemKind::Show => records.extend(collect_show_records(client, &item).await),
            ItemKind::Episode | ItemKind::Other => {
                debug!(title = %item.title, kind = %item.item_type, "skipping item");
            }
        }
    }
    Ok(records)
}

/// Episode rows for one show. Errors are logged and end the show early,
/// keeping whatever rows were already built.
pub async fn collect_show_records(
    client: &PlexClient,
    listed: &PlexMetadata,
) -> Vec<LibraryRecord> {
    let mut records = Vec::new();
    if let Err(err) = append_show_records(client, listed, &mut records).await {
        error!(show = %listed.title, kept = records.len(), "error processing show: {err}");
    }
    records
}

async fn append_show_records(
    client: &PlexClient,
    listed: &PlexMetadata,
    records: &mut Vec<LibraryRecord>,
) -> Result<(), PlexError> {
    let show = client.metadata(&listed.rating_key).await?;
    let mut seen = 0u64;
    let mut first_key: Option<String> = None;
    loop {
        let page = client.episode_page(&listed.rating_key, seen).await?;
        let step = client.page_step(&page, seen, first_key.as_deref());
        if step == PageStep::Repeated {
            warn!(show = %listed.title, "server repeated the first episode page, stopping");
            return Ok(());
        }
        if first_key.is_none() {
            first_key = page.metadata.first().map(|episode| episode.rating_key.clone());
        }
        seen += page.metadata.len() as u64;
        records.extend(
            page.metadata
                .iter()
                .map(|episode| episode_record(&show, episode)),
        );
        if step == PageStep::Last {
            return Ok(());
        }
    }
}
