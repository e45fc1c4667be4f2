//! Single-instance pipeline stages.
//!
//! ```text
//!                         / [worker 0] \
//! [source] --> [relay] --|     ...      |--> [verifier] --> [sink]
//!                         \ [worker n] /
//! ```
//!
//! Every stage owns its output queue's end-of-stream: it closes that queue
//! exactly once, after its input reached end-of-stream (or, for the source,
//! after cancellation). The worker pool sits between the relay and the
//! verifier and lives in [`crate::pool`].

mod relay;
mod sink;
mod source;
mod verifier;

pub use relay::relay;
pub use sink::discard;
pub use source::DocumentSource;
pub use verifier::{Verification, verify_documents};
