//! History view: past analyses, newest first

use chrono::DateTime;
use vibesync_common::i18n::Translations;

use super::escape;
use crate::controller::StateSnapshot;

pub(super) fn render(snapshot: &StateSnapshot, t: &Translations) -> String {
    if snapshot.history.is_empty() {
        return format!(
            "<section class=\"history empty\">\n\
             <h2>{title}</h2>\n\
             <p>{no_history}</p>\n\
             </section>",
            title = escape(t.title_history),
            no_history = escape(t.no_history),
        );
    }

    // History arrives newest-first from the store; render in order
    let rows = snapshot
        .history
        .iter()
        .map(|a| {
            format!(
                "<tr onclick=\"selectHistory('{id}')\">\n\
                 <td>{when}</td>\n\
                 <td>{genre}</td>\n\
                 <td>{mood}</td>\n\
                 <td>{tempo}</td>\n\
                 </tr>",
                id = escape(&a.id),
                when = format_timestamp(a.timestamp),
                genre = escape(&a.detected_genre),
                mood = escape(&a.mood),
                tempo = escape(&a.tempo),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<section class=\"history\">\n\
         <h2>{title}</h2>\n\
         <p>{desc}</p>\n\
         <table>\n<tbody>\n{rows}\n</tbody>\n</table>\n\
         </section>",
        title = escape(t.title_history),
        desc = escape(t.desc_history),
    )
}

/// Millisecond epoch timestamp as a readable UTC string
pub(super) fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_formats_as_utc_minutes() {
        // 2024-01-15 12:30:00 UTC
        assert_eq!(format_timestamp(1_705_321_800_000), "2024-01-15 12:30");
    }

    #[test]
    fn out_of_range_timestamp_renders_placeholder() {
        assert_eq!(format_timestamp(i64::MAX), "-");
    }
}
