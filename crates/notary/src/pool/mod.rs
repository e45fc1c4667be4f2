//! Fan-out / fan-in pool of signing workers.
//!
//! ## Structure
//!
//! - [`manager`] - [`WorkerPool`], which spawns the workers and owns the
//!   completion barrier that closes the merged queue.
//! - [`worker`] - the per-worker loop.

pub mod manager;
pub mod worker;


pub use manager::WorkerPool;
