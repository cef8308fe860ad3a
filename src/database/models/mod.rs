pub mod note;
pub mod notebook;
pub mod user;

pub use note::{NewNote, Note, NoteChanges};
pub use notebook::Notebook;
pub use user::{User, UserInfo, UserProfile};
