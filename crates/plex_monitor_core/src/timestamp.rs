use chrono::{DateTime, Local};

const TS_FORMAT: &str = "%Y%m%d_%H%M%S";
const PLEX_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run timestamp substituted for `{date}` in output file names.
pub fn current_timestamp() -> String {
    Local::now().format(TS_FORMAT).to_string()
}

/// Formats a Plex unix timestamp (seconds) in local time.
pub fn format_plex_time(seconds: i64) -> Option<String> {
    DateTime::from_timestamp(seconds, 0).map(|utc| {
        utc.with_timezone(&Local)
            .format(PLEX_TIME_FORMAT)
            .to_string()
    })
}
