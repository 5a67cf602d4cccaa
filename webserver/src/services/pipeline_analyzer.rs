//! MaterialAnalyzer backed by the analyzer crate's query pipeline

use std::sync::Arc;

use async_trait::async_trait;

use analyzer::{AnalyzerResult, LlmClient, QueryPipeline, ResultStore, StageOutcome};
use shared::{process_warn, MaterialInfo, ProcessId, Query};
use crate::traits::MaterialAnalyzer;
use crate::types::MaterialAssessment;

/// Real analyzer delegating to a shared pipeline
pub struct PipelineAnalyzer<L, S>
where
    L: LlmClient,
    S: ResultStore,
{
    pipeline: Arc<QueryPipeline<L, S>>,
}

impl<L, S> PipelineAnalyzer<L, S>
where
    L: LlmClient,
    S: ResultStore,
{
    pub fn new(pipeline: Arc<QueryPipeline<L, S>>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl<L, S> MaterialAnalyzer for PipelineAnalyzer<L, S>
where
    L: LlmClient + 'static,
    S: ResultStore + 'static,
{
    async fn analyze(&self, query: Query) -> AnalyzerResult<MaterialAssessment> {
        let outcome = self.pipeline.execute(&query).await?;
        if !outcome.persisted {
            process_warn!(
                ProcessId::current(),
                "⚠️ Result for {} was returned but not stored",
                query.material_name
            );
        }
        Ok(MaterialAssessment {
            result: outcome.result,
            chemicals: outcome.chemicals,
        })
    }

    async fn refine(&self, query: Query, chemicals: Vec<String>) -> AnalyzerResult<StageOutcome<MaterialInfo>> {
        self.pipeline.refine(&query, &chemicals).await
    }
}
