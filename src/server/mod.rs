//! Server module for Cortex
//!
//! Contains the server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `init`: Component wiring, router assembly and the run loop

pub mod config;
mod init;
mod loader;

pub use init::{build_pipeline, build_router, run};
pub use loader::load_config;
