//! Dashboard view: aggregate statistics over the analysis history

use std::collections::HashMap;

use vibesync_common::i18n::Translations;
use vibesync_common::AudioAnalysis;

use super::escape;
use crate::controller::StateSnapshot;

/// Genre occurrence counts, most frequent first, capped at five entries.
/// Ties keep first-seen order.
pub fn genre_counts(history: &[AudioAnalysis]) -> Vec<(String, usize)> {
    ranked_counts(history.iter().map(|a| a.detected_genre.as_str()))
        .into_iter()
        .take(5)
        .collect()
}

/// Mood occurrence counts, most frequent first
pub fn mood_counts(history: &[AudioAnalysis]) -> Vec<(String, usize)> {
    ranked_counts(history.iter().map(|a| a.mood.as_str()))
}

/// The most frequently detected mood, if any history exists
pub fn top_mood(history: &[AudioAnalysis]) -> Option<String> {
    mood_counts(history).into_iter().next().map(|(mood, _)| mood)
}

fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for value in values {
        if !counts.contains_key(value) {
            order.push(value);
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|v| (v.to_string(), counts[v]))
        .collect();
    // Stable sort preserves first-seen order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub(super) fn render(snapshot: &StateSnapshot, t: &Translations) -> String {
    if snapshot.history.is_empty() {
        return format!(
            "<section class=\"dashboard empty\">\n\
             <h2>{title}</h2>\n\
             <p>{no_data}</p>\n\
             <p>{no_data_sub}</p>\n\
             </section>",
            title = escape(t.title_dashboard),
            no_data = escape(t.no_data),
            no_data_sub = escape(t.no_data_sub),
        );
    }

    let genres = genre_counts(&snapshot.history)
        .into_iter()
        .map(|(genre, count)| format!("<li>{} <span>{count}</span></li>", escape(&genre)))
        .collect::<Vec<_>>()
        .join("\n    ");

    let moods = mood_counts(&snapshot.history)
        .into_iter()
        .map(|(mood, count)| format!("<li>{} <span>{count}</span></li>", escape(&mood)))
        .collect::<Vec<_>>()
        .join("\n    ");

    let latest = snapshot
        .history
        .first()
        .map(|a| a.detected_genre.as_str())
        .unwrap_or("-");
    let top = top_mood(&snapshot.history).unwrap_or_else(|| "-".to_string());

    format!(
        "<section class=\"dashboard\">\n\
         <h2>{title}</h2>\n\
         <p>{desc}</p>\n\
         <dl class=\"stats\">\n\
           <dt>{stat_scans}</dt><dd>{scans}</dd>\n\
           <dt>{stat_latest}</dt><dd>{latest}</dd>\n\
           <dt>{stat_freq_mood}</dt><dd>{top}</dd>\n\
         </dl>\n\
         <h3>{top_genres}</h3>\n\
         <ul>\n    {genres}\n</ul>\n\
         <h3>{mood_spectrum}</h3>\n\
         <ul>\n    {moods}\n</ul>\n\
         </section>",
        title = escape(t.title_dashboard),
        desc = escape(t.desc_dashboard),
        stat_scans = escape(t.stat_scans),
        scans = snapshot.history.len(),
        stat_latest = escape(t.stat_latest),
        latest = escape(latest),
        stat_freq_mood = escape(t.stat_freq_mood),
        top = escape(&top),
        top_genres = escape(t.top_genres),
        mood_spectrum = escape(t.mood_spectrum),
    )
}
