use crate::models::{LibraryRecord, PlexGuid, PlexMetadata, PlexTag, RecordKind};
use crate::timestamp::format_plex_time;

pub const IMDB_MARKER: &str = "imdb://";
pub const MAX_ACTORS: usize = 5;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const MS_PER_MINUTE: f64 = 60_000.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImdbInfo {
    pub imdb_id: Option<String>,
    pub imdb_url: Option<String>,
}

pub fn imdb_url(imdb_id: &str) -> String {
    format!("https://www.imdb.com/title/{imdb_id}/")
}

/// First guid carrying an `imdb://` id wins.
pub fn extract_imdb(guids: &[PlexGuid]) -> ImdbInfo {
    guids
        .iter()
        .find_map(|guid| guid.id.split_once(IMDB_MARKER))
        .map(|(_, rest)| {
            let id = rest.split(IMDB_MARKER).next().unwrap_or(rest).to_string();
            ImdbInfo {
                imdb_url: Some(imdb_url(&id)),
                imdb_id: Some(id),
            }
        })
        .unwrap_or_default()
}

pub fn join_tags(tags: &[PlexTag]) -> String {
    join_limited(tags, tags.len())
}

pub fn join_actors(roles: &[PlexTag]) -> String {
    join_limited(roles, MAX_ACTORS)
}

fn join_limited(tags: &[PlexTag], limit: usize) -> String {
    tags.iter()
        .take(limit)
        .map(|t| t.tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whole minutes, ties rounded to even.
pub fn duration_minutes(duration_ms: Option<i64>) -> Option<i64> {
    duration_ms
        .filter(|ms| *ms != 0)
        .map(|ms| (ms as f64 / MS_PER_MINUTE).round_ties_even() as i64)
}

/// Size of the first media entry's parts in GB, two decimals.
pub fn file_size_gb(item: &PlexMetadata) -> Option<f64> {
    let media = item.media.first()?;
    if media.parts.is_empty() {
        return None;
    }
    let bytes: u64 = media.parts.iter().filter_map(|part| part.size).sum();
    Some((bytes as f64 / BYTES_PER_GB * 100.0).round_ties_even() / 100.0)
}

/// Fields every row takes from the item it describes.
fn base_record(item: &PlexMetadata, kind: RecordKind) -> LibraryRecord {
    let imdb = extract_imdb(&item.guids);
    LibraryRecord {
        kind,
        title: item.title.clone(),
        show_title: String::new(),
        season: None,
        episode: None,
        year: item.year,
        rating: item.rating,
        content_rating: item.content_rating.clone(),
        duration_minutes: duration_minutes(item.duration),
        studio: item.studio.clone(),
        summary: item.summary.clone(),
        genres: join_tags(&item.genres),
        directors: join_tags(&item.directors),
        actors: join_actors(&item.roles),
        added_at: item.added_at.and_then(format_plex_time),
        last_viewed_at: item.last_viewed_at.and_then(format_plex_time),
        view_count: item.view_count.unwrap_or(0),
        file_path: item.locations().next().unwrap_or_default().to_string(),
        file_size_gb: file_size_gb(item),
        video_resolution: item
            .media
            .first()
            .and_then(|media| media.video_resolution.clone())
            .unwrap_or_default(),
        imdb_id: imdb.imdb_id,
        imdb_url: imdb.imdb_url,
        plex_key: item.key.clone(),
    }
}

pub fn movie_record(movie: &PlexMetadata) -> LibraryRecord {
    base_record(movie, RecordKind::Movie)
}

/// Studio, genres and cast come from the show; everything else from the episode.
pub fn episode_record(show: &PlexMetadata, episode: &PlexMetadata) -> LibraryRecord {
    LibraryRecord {
        show_title: show.title.clone(),
        season: episode.parent_index,
        episode: episode.index,
        studio: show.studio.clone(),
        genres: join_tags(&show.genres),
        actors: join_actors(&show.roles),
        ..base_record(episode, RecordKind::Episode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlexMedia, PlexPart};

    fn tags(names: &[&str]) -> Vec<PlexTag> {
        names
            .iter()
            .map(|name| PlexTag {
                tag: name.to_string(),
            })
            .collect()
    }

    fn guids(ids: &[&str]) -> Vec<PlexGuid> {
        ids.iter().map(|id| PlexGuid { id: id.to_string() }).collect()
    }

    #[test]
    fn imdb_first_match_wins() {
        let info = extract_imdb(&guids(&["tmdb://278", "imdb://tt0111161", "imdb://tt9999999"]));
        assert_eq!(info.imdb_id.as_deref(), Some("tt0111161"));
        assert_eq!(
            info.imdb_url.as_deref(),
            Some("https://www.imdb.com/title/tt0111161/")
        );
    }

    #[test]
    fn imdb_absent_without_marker() {
        assert_eq!(extract_imdb(&guids(&["tmdb://278", "tvdb://81189"])), ImdbInfo::default());
        assert_eq!(extract_imdb(&[]), ImdbInfo::default());
    }

    #[test]
    fn duration_rounds_to_minutes() {
        assert_eq!(duration_minutes(Some(125_000)), Some(2));
        assert_eq!(duration_minutes(Some(150_000)), Some(2));
        assert_eq!(duration_minutes(Some(0)), None);
        assert_eq!(duration_minutes(None), None);
    }

    #[test]
    fn file_size_sums_first_media_parts() {
        let item = PlexMetadata {
            media: vec![
                PlexMedia {
                    video_resolution: Some("1080".into()),
                    parts: vec![
                        PlexPart {
                            file: Some("/movies/a.mkv".into()),
                            size: Some(1_073_741_824),
                        },
                        PlexPart {
                            file: Some("/movies/b.mkv".into()),
                            size: Some(2_147_483_648),
                        },
                    ],
                },
                PlexMedia {
                    video_resolution: Some("4k".into()),
                    parts: vec![PlexPart {
                        file: Some("/movies/c.mkv".into()),
                        size: Some(9_999_999_999),
                    }],
                },
            ],
            ..Default::default()
        };
        assert_eq!(file_size_gb(&item), Some(3.0));
        assert_eq!(file_size_gb(&PlexMetadata::default()), None);
    }

    #[test]
    fn actors_truncate_to_five_in_order() {
        let roles = tags(&["A", "B", "C", "D", "E", "F", "G"]);
        assert_eq!(join_actors(&roles), "A, B, C, D, E");
        assert_eq!(join_tags(&tags(&["Drama", "Crime"])), "Drama, Crime");
        assert_eq!(join_tags(&[]), "");
    }

    #[test]
    fn episode_inherits_show_fields() {
        let show = PlexMetadata {
            title: "The Wire".into(),
            studio: Some("HBO".into()),
            genres: tags(&["Crime", "Drama"]),
            roles: tags(&["Dominic West", "Idris Elba"]),
            ..Default::default()
        };
        let episode = PlexMetadata {
            title: "The Target".into(),
            key: "/library/metadata/501".into(),
            parent_index: Some(1),
            index: Some(1),
            studio: Some("ignored".into()),
            directors: tags(&["Clark Johnson"]),
            guids: guids(&["imdb://tt0749451"]),
            ..Default::default()
        };
        let record = episode_record(&show, &episode);
        assert_eq!(record.kind, RecordKind::Episode);
        assert_eq!(record.show_title, "The Wire");
        assert_eq!(record.studio.as_deref(), Some("HBO"));
        assert_eq!(record.genres, "Crime, Drama");
        assert_eq!(record.actors, "Dominic West, Idris Elba");
        assert_eq!(record.directors, "Clark Johnson");
        assert_eq!((record.season, record.episode), (Some(1), Some(1)));
        assert_eq!(record.imdb_id.as_deref(), Some("tt0749451"));
        assert_eq!(record.plex_key, "/library/metadata/501");
        assert_eq!(record.view_count, 0);
        assert_eq!(record.file_path, "");
    }
}
