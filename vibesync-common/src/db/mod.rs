//! Database access
//!
//! Schema initialization plus typed queries for the two tables backing the
//! persistence API: `history` and `notes`.

mod history;
mod init;
mod notes;

pub use history::{insert_analysis, list_history};
pub use init::init_database;
pub use notes::{delete_note, insert_note, list_notes};
