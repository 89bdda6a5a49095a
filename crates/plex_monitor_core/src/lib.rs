pub mod client;
pub mod config;
pub mod csv_utils;
pub mod errors;
pub mod export;
pub mod models;
pub mod records;
pub mod timestamp;

pub use client::{ClientOptions, PageStep, PlexClient, DEFAULT_HEADERS};
pub use config::{MonitorConfig, PLACEHOLDER_TOKEN};
pub use csv_utils::{
    encode_records, latest_csv_filename, read_csv_rows, render_csv_filename, FIELDNAMES,
};
pub use errors::{ExportError, PlexError, SetupError};
pub use export::{
    client_options,
    collect_library_records,
    collect_show_records,
    export_all,
    export_library,
    run,
    run_blocking,
    BatchSummary,
    LibraryExport,
    LibraryOutcome,
    RunOverrides,
};
pub use models::{ItemKind, LibraryRecord, LibrarySection, PlexMetadata, RecordKind, ServerInfo};
pub use records::{episode_record, extract_imdb, movie_record, ImdbInfo};
pub use timestamp::{current_timestamp, format_plex_time};
