use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::PlexError;
use crate::models::LibraryRecord;

pub const FIELDNAMES: [&str; 23] = [
    "type",
    "title",
    "show_title",
    "season",
    "episode",
    "year",
    "rating",
    "content_rating",
    "duration_minutes",
    "studio",
    "summary",
    "genres",
    "directors",
    "actors",
    "added_at",
    "last_viewed_at",
    "view_count",
    "file_path",
    "file_size_gb",
    "video_resolution",
    "imdb_id",
    "imdb_url",
    "plex_key",
];

/// Library name as it appears in file names.
pub fn library_slug(library: &str) -> String {
    library.replace(' ', "_")
}

pub fn render_csv_filename(template: &str, library: &str, date: &str) -> String {
    template
        .replace("{library}", &library_slug(library))
        .replace("{date}", date)
}

pub fn latest_csv_filename(library: &str) -> String {
    format!("plex_library_{}_latest.csv", library_slug(library))
}

/// Header row plus one row per record, UTF-8.
pub fn encode_records(records: &[LibraryRecord]) -> Result<Vec<u8>, PlexError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(FIELDNAMES)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|err| PlexError::Io(err.into_error()))
}

pub fn write_snapshot(path: &Path, contents: &[u8]) -> Result<PathBuf, PlexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(path.to_path_buf())
}

/// Writes through a temp file in the same directory, then renames over `path`.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<PathBuf, PlexError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| PlexError::Io(err.error))?;
    Ok(path.to_path_buf())
}

pub fn read_csv_rows(path: &Path) -> Result<Vec<csv::StringRecord>, PlexError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }
    Ok(rows)
}
