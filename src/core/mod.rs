//! Core application primitives (orchestrator, scheduler, HTTP surface)

pub mod context;
pub mod http;
pub mod orchestrator;
pub mod scheduler;

pub use context::*;
pub use http::*;
pub use orchestrator::*;
pub use scheduler::*;
