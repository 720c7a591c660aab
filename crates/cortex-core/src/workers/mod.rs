//! Worker registry and dispatch
//!
//! A worker is a named model configuration with a role-derived system
//! prompt. The registry is immutable per snapshot; the dispatcher resolves
//! names and calls the completion service.

pub mod config;
pub mod dispatcher;
pub mod prompts;
pub mod registry;


pub use config::{fallback_workers, WorkerConfig};
pub use dispatcher::WorkerDispatcher;
pub use prompts::system_prompt;
pub use registry::{SharedWorkerRegistry, Worker, WorkerRegistry};
