//! Error types for the fold-screen and multi-screen managers.

/// Errors reported by display-management operations.
///
/// Only fallible entry points return these; policy mutators log and return
/// instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum DmError {
    /// A screen session, physical session or client proxy was missing.
    #[error("screen session or client proxy is null")]
    NullPtr,

    /// No handler exists for the requested switch type or combination pair.
    #[error("no handler for the requested change")]
    InvalidCalling,

    /// The window-scene client rejected a display-node or session change.
    #[error("remote client failed to apply the change")]
    RemoteCreateFailed,

    /// The crease region config did not contain exactly four values.
    #[error("invalid crease region {config:?} ({tokens} values, expected 4)")]
    InvalidCreaseRegion {
        /// The raw config string.
        config: String,
        /// Number of values found.
        tokens: usize,
    },

    /// A crease region value was not an integer.
    #[error("invalid crease region value: {0}")]
    InvalidCreaseToken(#[from] std::num::ParseIntError),

    /// The crease region width or height was negative.
    #[error("negative crease region extent {width}x{height}")]
    NegativeCreaseExtent {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },

    /// An I/O error occurred (e.g., spawning a scheduler thread).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
