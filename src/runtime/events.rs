//! Editor notifications for the host UI.

use crate::persist::MetafieldRecord;

/// Events emitted from the editor runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The explicit assignment changed; the grouped map must be re-read.
    AssignmentsChanged {
        /// Number of variant groups after the change.
        groups: usize,
    },
    /// A save was accepted and is in flight.
    SaveStarted,
    /// The save completed.
    Saved {
        /// Written metafields.
        metafields: Vec<MetafieldRecord>,
    },
    /// The save failed; local edits are kept.
    SaveFailed {
        /// User-facing error text.
        message: String,
    },
}
