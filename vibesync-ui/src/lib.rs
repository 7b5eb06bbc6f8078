//! vibesync-ui library - the VibeSync client application
//!
//! Hosts the recording pipeline (microphone capture, spectrum analyser,
//! live visualizer), the Gemini analysis/chat clients, the persistence
//! client, the view/state controller, and the HTTP/SSE surface that
//! exposes the rendered views and control endpoints.

pub mod backend;
pub mod capture;
pub mod controller;
pub mod events;
pub mod gemini;
pub mod server;
pub mod spectrum;
pub mod views;
pub mod visualizer;
