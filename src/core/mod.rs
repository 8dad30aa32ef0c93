//! In-memory editor state.

/// Editor session with undo/redo and the save busy flag.
pub mod session;
