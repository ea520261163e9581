pub mod api;
pub mod error;

// Convenience re-exports
pub use api::client::NotesClient;
pub use api::types;
pub use error::{NoteError, Result};
