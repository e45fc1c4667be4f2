#![doc = include_str!("../README.md")]

mod barrier;
mod document;
mod error;
mod pipeline;
pub mod pool;
mod queue;
mod shutdown;
mod signature;
pub mod stage;
mod text;

pub use crate::barrier::*;
pub use crate::document::*;
pub use crate::error::*;
pub use crate::pipeline::*;
pub use crate::pool::WorkerPool;
pub use crate::queue::*;
pub use crate::shutdown::*;
pub use crate::signature::*;
pub use crate::stage::{DocumentSource, Verification};
pub use crate::text::*;
