//! Analyzer services implementations

pub mod experiment_log;
pub mod llm_client;
pub mod result_store;

#[cfg(test)]
pub mod tests;

pub use experiment_log::*;
pub use llm_client::*;
pub use result_store::*;
