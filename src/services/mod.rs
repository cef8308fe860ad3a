pub mod account;
pub mod export;
pub mod notebooks;
pub mod notes;

pub use account::{AccountService, Session};
pub use export::{ExportClient, ExportError, ExportedPdf};
pub use notebooks::NotebookService;
pub use notes::NoteService;
