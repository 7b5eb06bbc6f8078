//! Analyzer view: recorder card, current analysis, vibe matches

use vibesync_common::i18n::Translations;
use vibesync_common::AudioAnalysis;

use super::{escape, youtube_search_url};
use crate::controller::StateSnapshot;
use crate::visualizer::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub(super) fn render(snapshot: &StateSnapshot, t: &Translations) -> String {
    let status = if snapshot.is_recording {
        t.status_recording
    } else {
        t.status_ready
    };

    let button = if snapshot.is_analyzing {
        format!("<button disabled>{}</button>", escape(t.btn_analyze))
    } else if snapshot.is_recording {
        format!(
            "<button onclick=\"stopRecording()\">{}</button>",
            escape(t.btn_stop)
        )
    } else {
        format!(
            "<button onclick=\"startRecording()\">{}</button>",
            escape(t.btn_start)
        )
    };

    let analysis = match &snapshot.current_analysis {
        Some(analysis) => render_analysis(analysis, t),
        None => format!("<p class=\"empty\">{}</p>", escape(t.empty_analysis)),
    };

    format!(
        "<section class=\"recorder\">\n\
         <h2>{title}</h2>\n\
         <p>{desc}</p>\n\
         <p class=\"input-source\">{input_source}</p>\n\
         <canvas id=\"visualizer\" width=\"{width}\" height=\"{height}\"></canvas>\n\
         <p class=\"status\">{status}</p>\n\
         {button}\n\
         </section>\n\
         <section class=\"analysis\">\n{analysis}\n</section>",
        title = escape(t.title_analyzer),
        desc = escape(t.desc_analyzer),
        input_source = escape(t.input_source),
        width = CANVAS_WIDTH as u32,
        height = CANVAS_HEIGHT as u32,
        status = escape(status),
    )
}

fn render_analysis(analysis: &AudioAnalysis, t: &Translations) -> String {
    let elements = analysis
        .key_elements
        .iter()
        .map(|e| format!("<span class=\"chip\">{}</span>", escape(e)))
        .collect::<Vec<_>>()
        .join(" ");

    let matches = analysis
        .recommendations
        .iter()
        .enumerate()
        .map(|(index, rec)| {
            let score = rec.similarity_score.round() as i64;
            format!(
                "<li>\n\
                 <strong>{title}</strong> — {artist}\n\
                 <p>{reason}</p>\n\
                 <span class=\"score\">{score}% {match_label}</span>\n\
                 <a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{listen}</a>\n\
                 <button onclick=\"addRecommendationNote({index})\">{add_note}</button>\n\
                 </li>",
                title = escape(&rec.title),
                artist = escape(&rec.artist),
                reason = escape(&rec.reason),
                match_label = escape(t.match_score),
                url = youtube_search_url(&rec.artist, &rec.title),
                listen = escape(t.btn_listen_yt),
                add_note = escape(t.btn_add_note),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<h3>{genre}</h3>\n\
         <p class=\"mood\">{mood}</p>\n\
         <p class=\"tempo\">{tempo} {bpm_label}</p>\n\
         <h4>{fingerprint}</h4>\n\
         <div class=\"elements\">{elements}</div>\n\
         <h4>{vibe_label}</h4>\n\
         <p>{description}</p>\n\
         <h4>{matches_label}</h4>\n\
         <ul class=\"matches\">\n{matches}\n</ul>",
        genre = escape(&analysis.detected_genre),
        mood = escape(&analysis.mood),
        tempo = escape(&analysis.tempo),
        bpm_label = escape(t.label_bpm),
        fingerprint = escape(t.label_fingerprint),
        vibe_label = escape(t.label_vibe_analysis),
        description = escape(&analysis.vibe_description),
        matches_label = escape(t.label_matches),
    )
}
