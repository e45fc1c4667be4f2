//! Error types for the signing pipeline.
//!
//! Only conditions that indicate a broken shutdown protocol, a bad
//! configuration or a dead task are errors. A document whose signature does
//! not verify is *not* an error: the verifier drops and counts it.
//!
//! ## Error Cases
//! - `PutAfterClose`: an item was enqueued after the queue was closed.
//! - `DoubleClose`: a queue was closed more than once.
//! - `InvalidConfig`: the pipeline was asked to run with unusable settings.
//! - `TaskFailed`: a stage task panicked or was aborted.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the pipeline.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// An item was put into a queue after `close` had been called on it.
    #[error("Put into closed queue `{queue}`")]
    PutAfterClose { queue: String },

    /// `close` was called on a queue that was already closed.
    #[error("Queue `{queue}` closed more than once")]
    DoubleClose { queue: String },

    /// The pipeline configuration cannot be used.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A stage task panicked or was cancelled before reporting.
    #[error("Task failed: {context}")]
    TaskFailed { context: String },
}

impl Error {
    /// Returns `true` for errors caused by violating the queue protocol.
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::PutAfterClose { .. } | Self::DoubleClose { .. })
    }
}
