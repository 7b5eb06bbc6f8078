//! Presentation views
//!
//! Render-only HTML generation from a state snapshot. Views never mutate
//! state; every interactive element posts to a control endpoint and the
//! page re-renders from the next snapshot.

mod analyzer;
mod dashboard;
mod history;
mod notes;

pub use dashboard::{genre_counts, mood_counts, top_mood};
pub use notes::related_label;

use vibesync_common::i18n::Translations;
use vibesync_common::AppView;

use crate::controller::StateSnapshot;

/// Render the full page for the snapshot's active view
pub fn render_page(snapshot: &StateSnapshot) -> String {
    let t = Translations::get(snapshot.language);
    let body = match snapshot.active_view {
        AppView::Analyzer => analyzer::render(snapshot, t),
        AppView::Dashboard => dashboard::render(snapshot, t),
        AppView::History => history::render(snapshot, t),
        AppView::Notes => notes::render(snapshot, t),
    };
    shell(snapshot, t, &body)
}

/// Common chrome: header, navigation, chat panel
fn shell(snapshot: &StateSnapshot, t: &Translations, body: &str) -> String {
    let nav = [
        (AppView::Analyzer, t.nav_listen),
        (AppView::Dashboard, t.nav_stats),
        (AppView::History, t.nav_history),
        (AppView::Notes, t.nav_notes),
    ]
    .iter()
    .map(|(view, label)| {
        let active = if *view == snapshot.active_view {
            " class=\"active\""
        } else {
            ""
        };
        format!(
            "<button{active} onclick=\"setView('{}')\">{}</button>",
            format!("{view:?}").to_uppercase(),
            escape(label)
        )
    })
    .collect::<Vec<_>>()
    .join("\n      ");

    let chat = chat_panel(snapshot, t);
    let language = snapshot.language.code().to_uppercase();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>VibeSync</title>\n\
         </head>\n\
         <body data-view=\"{view:?}\">\n\
         <header>\n\
           <h1>VibeSync</h1>\n\
           <span class=\"system-ok\">{system_ok}</span>\n\
           <button onclick=\"toggleLanguage()\">{language}</button>\n\
         </header>\n\
         <nav>\n      {nav}\n</nav>\n\
         <main>\n{body}\n</main>\n\
         {chat}\n\
         </body>\n\
         </html>\n",
        lang = snapshot.language.code(),
        view = snapshot.active_view,
        system_ok = escape(t.system_ok),
    )
}

fn chat_panel(snapshot: &StateSnapshot, t: &Translations) -> String {
    let messages = snapshot
        .chat
        .iter()
        .map(|m| {
            format!(
                "<li class=\"{:?}\">{}</li>",
                m.role,
                escape(&m.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n    ");

    format!(
        "<aside class=\"chat\">\n\
         <h2>{title}</h2>\n\
         <ul>\n    {messages}\n</ul>\n\
         <form onsubmit=\"sendChat(event)\">\n\
           <input name=\"message\" placeholder=\"{placeholder}\">\n\
         </form>\n\
         </aside>",
        title = escape(t.chat_title),
        placeholder = escape(t.chat_placeholder),
    )
}

/// YouTube search link for a recommendation
pub fn youtube_search_url(artist: &str, title: &str) -> String {
    let query = format!("{artist} {title} official audio");
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(&query)
    )
}

/// Minimal HTML text escaping
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_url_encodes_full_query() {
        let url = youtube_search_url("Nujabes", "Feather");
        assert_eq!(
            url,
            "https://www.youtube.com/results?search_query=Nujabes%20Feather%20official%20audio"
        );
    }

    #[test]
    fn youtube_url_escapes_reserved_characters() {
        let url = youtube_search_url("AC/DC", "Back & Forth");
        assert!(url.ends_with("AC%2FDC%20Back%20%26%20Forth%20official%20audio"));
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
