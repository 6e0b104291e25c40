//! toolflow: natural-language tool orchestration.
//!
//! A request is planned by an external reasoning service (or by keyword
//! matching when that service is unavailable), executed step by step against
//! a registry of deterministic tools, and the results are synthesized back
//! into one answer.

pub mod channels;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod safety;
pub mod tools;
pub mod workflow;

pub use config::Config;
pub use error::Error;
