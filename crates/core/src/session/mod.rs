//! Display-name session: persistence and the capture gate.

pub mod gate;
pub mod store;

pub use gate::{normalize_submission, NameInput, MAX_NAME_LEN};
pub use store::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
