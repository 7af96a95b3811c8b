//! Runtime subsystem modules.

pub(crate) mod command;
pub(crate) mod context;
mod core;
pub(crate) mod queue;
pub(crate) mod scheduler;
pub(crate) mod waker;
pub mod yield_now;

pub use self::core::Runtime;
