//! Notes view: note list with weak references into history

use vibesync_common::i18n::Translations;
use vibesync_common::{AudioAnalysis, Note};

use super::escape;
use super::history::format_timestamp;
use crate::controller::StateSnapshot;

/// Resolve a note's analysis reference against the history collection.
///
/// The reference is weak: a missing analysis yields `None` and the note
/// renders without a context label.
pub fn related_label(note: &Note, history: &[AudioAnalysis]) -> Option<String> {
    let id = note.related_analysis_id.as_deref()?;
    history
        .iter()
        .find(|a| a.id == id)
        .map(|a| format!("{} - {}", a.detected_genre, a.mood))
}

pub(super) fn render(snapshot: &StateSnapshot, t: &Translations) -> String {
    let list = if snapshot.notes.is_empty() {
        format!("<p class=\"empty\">{}</p>", escape(t.note_empty))
    } else {
        let items = snapshot
            .notes
            .iter()
            .map(|note| {
                let context = related_label(note, &snapshot.history)
                    .map(|label| format!("<span class=\"context\">{}</span>", escape(&label)))
                    .unwrap_or_default();
                format!(
                    "<li>\n\
                     <p>{content}</p>\n\
                     <time>{when}</time>\n\
                     {context}\n\
                     <button onclick=\"deleteNote('{id}')\">×</button>\n\
                     </li>",
                    content = escape(&note.content),
                    when = format_timestamp(note.timestamp),
                    id = escape(&note.id),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("<ul class=\"notes\">\n{items}\n</ul>")
    };

    format!(
        "<section class=\"notes\">\n\
         <h2>{title}</h2>\n\
         <p>{desc}</p>\n\
         <form onsubmit=\"saveNote(event)\">\n\
           <h3>{note_new}</h3>\n\
           <textarea name=\"content\" placeholder=\"{placeholder}\"></textarea>\n\
           <button type=\"submit\">{save}</button>\n\
         </form>\n\
         {list}\n\
         </section>",
        title = escape(t.title_notes),
        desc = escape(t.desc_notes),
        note_new = escape(t.note_new),
        placeholder = escape(t.note_placeholder),
        save = escape(t.note_save),
    )
}
