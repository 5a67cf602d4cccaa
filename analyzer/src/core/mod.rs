//! Core pipeline logic: prompts, schemas, pricing and the query flow

pub mod batch;
pub mod pipeline;
pub mod pricing;
pub mod prompt;
pub mod samples;
pub mod schema;

pub use batch::{run_batch, select_materials, BatchOptions, BatchSummary};
pub use pipeline::QueryPipeline;
pub use pricing::CostModel;
pub use prompt::{PromptKind, PromptStore, PromptTemplate};
pub use schema::FunctionSchema;
