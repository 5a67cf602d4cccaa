//! PFAS analysis library
//!
//! Turns a material name into a PFAS assessment with two forced
//! function-call requests to an Azure OpenAI deployment, and records every
//! completed query to a JSON and CSV log.

pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use crate::core::{BatchOptions, BatchSummary, CostModel, PromptStore, QueryPipeline};
pub use error::{AnalyzerError, AnalyzerResult};
pub use traits::*;
pub use types::*;
pub use services::{FileResultStore, RealLlmClient};

/// Pipeline wired to the real Azure client and file store
pub type DefaultPipeline = QueryPipeline<RealLlmClient, FileResultStore>;

/// Build the production pipeline from configuration
pub async fn build_pipeline(config: &shared::AppConfig) -> AnalyzerResult<DefaultPipeline> {
    let llm = RealLlmClient::new(&config.llm)?;
    let store = FileResultStore::new(&config.storage);
    let prompts = PromptStore::load(&config.storage.prompt_dir).await?;
    let pricing = CostModel::for_model(&config.llm.model_name);
    Ok(QueryPipeline::new(llm, store, prompts, pricing))
}
