//! UI translations
//!
//! Static English/Spanish string tables. The controller uses the chat and
//! error strings; the views use the rest.

use crate::model::Language;

/// Translated UI strings for one language
#[derive(Debug, Clone, Copy)]
pub struct Translations {
    pub nav_listen: &'static str,
    pub nav_stats: &'static str,
    pub nav_history: &'static str,
    pub nav_notes: &'static str,
    pub ai_assistant: &'static str,
    pub title_analyzer: &'static str,
    pub title_dashboard: &'static str,
    pub title_history: &'static str,
    pub title_notes: &'static str,
    pub desc_analyzer: &'static str,
    pub desc_dashboard: &'static str,
    pub desc_history: &'static str,
    pub desc_notes: &'static str,
    pub system_ok: &'static str,
    pub input_source: &'static str,
    pub status_recording: &'static str,
    pub status_ready: &'static str,
    pub btn_analyze: &'static str,
    pub btn_start: &'static str,
    pub btn_stop: &'static str,
    pub label_bpm: &'static str,
    pub label_fingerprint: &'static str,
    pub label_vibe_analysis: &'static str,
    pub label_matches: &'static str,
    pub empty_analysis: &'static str,
    pub match_score: &'static str,
    pub btn_add_note: &'static str,
    pub btn_listen_yt: &'static str,
    pub no_data: &'static str,
    pub no_data_sub: &'static str,
    pub top_genres: &'static str,
    pub mood_spectrum: &'static str,
    pub stat_scans: &'static str,
    pub stat_latest: &'static str,
    pub stat_freq_mood: &'static str,
    pub no_history: &'static str,
    pub note_new: &'static str,
    pub note_placeholder: &'static str,
    pub note_save: &'static str,
    pub note_empty: &'static str,
    pub chat_placeholder: &'static str,
    pub chat_intro: &'static str,
    pub chat_error: &'static str,
    pub chat_title: &'static str,
    pub error_mic_denied: &'static str,
    pub error_analysis_failed: &'static str,
}

const EN: Translations = Translations {
    nav_listen: "Listen",
    nav_stats: "Vibe Stats",
    nav_history: "History",
    nav_notes: "Notes",
    ai_assistant: "AI Assistant",
    title_analyzer: "Sonic Analyzer",
    title_dashboard: "Vibe Intelligence",
    title_history: "Sonic Archives",
    title_notes: "Session Notes",
    desc_analyzer: "Capture audio to decompose rhythm, flow, and context.",
    desc_dashboard: "Visualizing your musical journey and patterns.",
    desc_history: "All your previous analyses in one place.",
    desc_notes: "Your thoughts on tracks, production, and vibes.",
    system_ok: "System Operational",
    input_source: "Input Source",
    status_recording: "RECORDING LIVE",
    status_ready: "READY",
    btn_analyze: "Analyzing Vibe...",
    btn_start: "Start Listening",
    btn_stop: "Stop & Analyze",
    label_bpm: "BPM Est.",
    label_fingerprint: "Sonic Fingerprint",
    label_vibe_analysis: "Vibe Analysis",
    label_matches: "Vibe Matches",
    empty_analysis: "Record audio to generate deep-learning vibe recommendations.",
    match_score: "Match",
    btn_add_note: "Add Note",
    btn_listen_yt: "Listen on YouTube",
    no_data: "No data collected yet.",
    no_data_sub: "Start analyzing music to build your dashboard.",
    top_genres: "Top Detected Genres",
    mood_spectrum: "Mood Spectrum",
    stat_scans: "Total Scans",
    stat_latest: "Latest Vibe",
    stat_freq_mood: "Top Mood",
    no_history: "No history found.",
    note_new: "New Note",
    note_placeholder: "Write your thoughts about a vibe, style, or track...",
    note_save: "Save Note",
    note_empty: "No notes yet. Capture your ideas!",
    chat_placeholder: "Ask about genres, tempo...",
    chat_intro: "Hey! I'm VibeBot. Record some music and I'll help you find similar tracks!",
    chat_error: "Sorry, I spaced out. Try again?",
    chat_title: "Vibe Assistant",
    error_mic_denied: "Please allow microphone access to use VibeSync.",
    error_analysis_failed: "Could not analyze audio. Please try again.",
};

const ES: Translations = Translations {
    nav_listen: "Escuchar",
    nav_stats: "Estadísticas",
    nav_history: "Historial",
    nav_notes: "Notas",
    ai_assistant: "Asistente IA",
    title_analyzer: "Analizador Sónico",
    title_dashboard: "Inteligencia Vibe",
    title_history: "Archivos Sónicos",
    title_notes: "Notas de Sesión",
    desc_analyzer: "Captura audio para descomponer ritmo, flow y contexto.",
    desc_dashboard: "Visualizando tu viaje musical y patrones.",
    desc_history: "Todos tus análisis anteriores en un solo lugar.",
    desc_notes: "Tus pensamientos sobre pistas, producción y vibras.",
    system_ok: "Sistema Operativo",
    input_source: "Fuente de Audio",
    status_recording: "GRABANDO EN VIVO",
    status_ready: "LISTO",
    btn_analyze: "Analizando Vibe...",
    btn_start: "Escuchar Ahora",
    btn_stop: "Parar y Analizar",
    label_bpm: "BPM Est.",
    label_fingerprint: "Huella Sonora",
    label_vibe_analysis: "Análisis de Vibe",
    label_matches: "Coincidencias",
    empty_analysis: "Graba audio para generar recomendaciones profundas.",
    match_score: "Coincidencia",
    btn_add_note: "Añadir Nota",
    btn_listen_yt: "Escuchar en YouTube",
    no_data: "Sin datos recolectados.",
    no_data_sub: "Empieza a analizar música para construir tu tablero.",
    top_genres: "Géneros Detectados Top",
    mood_spectrum: "Espectro Emocional",
    stat_scans: "Escaneos Totales",
    stat_latest: "Último Vibe",
    stat_freq_mood: "Mood Top",
    no_history: "No se encontró historial.",
    note_new: "Nueva Nota",
    note_placeholder: "Escribe tus ideas sobre un estilo, vibra o pista...",
    note_save: "Guardar Nota",
    note_empty: "Sin notas aún. ¡Captura tus ideas!",
    chat_placeholder: "Pregunta sobre géneros, tempo...",
    chat_intro: "¡Hola! Soy VibeBot. Graba música y te ayudaré a encontrar pistas similares.",
    chat_error: "¿Perdón? Me distraje. ¿Intentamos de nuevo?",
    chat_title: "Asistente Vibe",
    error_mic_denied: "Permite el acceso al micrófono para usar VibeSync.",
    error_analysis_failed: "No se pudo analizar el audio. Inténtalo de nuevo.",
};

impl Translations {
    /// Look up the string table for a language
    pub fn get(language: Language) -> &'static Translations {
        match language {
            Language::En => &EN,
            Language::Es => &ES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_language_has_its_own_greeting() {
        let en = Translations::get(Language::En);
        let es = Translations::get(Language::Es);
        assert_ne!(en.chat_intro, es.chat_intro);
        assert!(en.chat_intro.contains("VibeBot"));
        assert!(es.chat_intro.contains("VibeBot"));
    }
}
