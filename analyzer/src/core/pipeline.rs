//! Two-stage query pipeline: chemical extraction, then PFAS analysis

use std::collections::HashMap;
use std::time::Instant;

use shared::{
    process_debug, process_error, process_info, process_warn, ChemicalComposition, LogRecord,
    MaterialInfo, ProcessId, Query,
};

use crate::core::prompt::{PromptKind, PromptStore, PromptTemplate, ANALYSIS_HUMAN_TEMPLATE, EXTRACTION_HUMAN_TEMPLATE};
use crate::core::pricing::CostModel;
use crate::core::samples::{analysis_example, chemical_composition_example};
use crate::core::schema::FunctionSchema;
use crate::error::AnalyzerResult;
use crate::traits::{LlmClient, ResultStore};
use crate::types::{ChatMessage, FunctionCallRequest, QueryOutcome, StageOutcome};

/// Runs queries against the model and records each completed run
pub struct QueryPipeline<L, S>
where
    L: LlmClient,
    S: ResultStore,
{
    llm: L,
    store: S,
    prompts: PromptStore,
    pricing: CostModel,
}

impl<L, S> QueryPipeline<L, S>
where
    L: LlmClient,
    S: ResultStore,
{
    pub fn new(llm: L, store: S, prompts: PromptStore, pricing: CostModel) -> Self {
        Self {
            llm,
            store,
            prompts,
            pricing,
        }
    }

    /// Run both stages for `query` and append the resulting record
    ///
    /// Provider failures degrade the affected stage instead of failing the
    /// query. Only template rendering errors are returned.
    pub async fn execute(&self, query: &Query) -> AnalyzerResult<QueryOutcome> {
        let process_id = ProcessId::current();
        let start = Instant::now();

        process_info!(
            process_id,
            "🔎 Received query: material={}, manufacturer={}, work_content={}",
            query.material_name,
            query.manufacturer_name,
            query.work_content
        );

        let extraction = self.extract_composition(query).await?;
        let extraction_usage = extraction.usage();
        let composition = extraction.into_value();
        let chemicals = composition
            .as_ref()
            .map(ChemicalComposition::chemical_names)
            .unwrap_or_default();

        let analysis = self.analyze(query, &chemicals, None).await?;
        let analysis_usage = analysis.usage();
        let analyzed = analysis.into_value();
        let result = analyzed
            .clone()
            .unwrap_or_else(|| MaterialInfo::undetermined(&query.material_name));

        let record = LogRecord::new(
            query,
            start.elapsed().as_secs_f64(),
            composition,
            extraction_usage,
            analysis_usage,
            analyzed,
        );

        let persisted = match self.store.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                process_error!(process_id, "❌ Could not store result for {}: {}", record.material, e);
                false
            }
        };

        process_info!(
            process_id,
            "✅ Query for {} finished in {:.2}s: PFAS status {} (total cost ${:.4})",
            record.material,
            record.duration,
            result.pfas_status(),
            record.total_cost
        );

        Ok(QueryOutcome {
            result,
            chemicals,
            record,
            persisted,
        })
    }

    /// Re-run only the analysis stage with caller-supplied context; nothing is stored
    pub async fn refine(&self, query: &Query, chemicals: &[String]) -> AnalyzerResult<StageOutcome<MaterialInfo>> {
        process_info!(
            ProcessId::current(),
            "🔁 Refining analysis for {} with additional info",
            query.material_name
        );
        self.analyze(query, chemicals, query.additional_info.as_deref()).await
    }

    /// Stage one: ask the model for the material's chemical composition
    pub async fn extract_composition(&self, query: &Query) -> AnalyzerResult<StageOutcome<ChemicalComposition>> {
        let system = self.render_system(PromptKind::ChemicalExtraction, chemical_composition_example())?;
        let human = PromptTemplate::new("extraction_human", EXTRACTION_HUMAN_TEMPLATE)
            .render(&HashMap::from([("material", query.material_name.clone())]))?;

        process_debug!(ProcessId::current(), "Invoking chemical information stage");
        let outcome = self.call_function::<ChemicalComposition>(system, human).await;

        match &outcome {
            StageOutcome::Completed { value, usage } => {
                process_info!(
                    ProcessId::current(),
                    "🧪 Chemical composition received: {} chemicals ({} tokens)",
                    value.chemicals.len(),
                    usage.total_tokens
                );
            }
            StageOutcome::Degraded { reason } => {
                process_error!(
                    ProcessId::current(),
                    "❌ Chemical composition retrieval failed for {}: {}",
                    query.material_name,
                    reason
                );
            }
        }
        Ok(outcome)
    }

    /// Stage two: ask the model for the PFAS decision
    pub async fn analyze(
        &self,
        query: &Query,
        chemicals: &[String],
        additional_info: Option<&str>,
    ) -> AnalyzerResult<StageOutcome<MaterialInfo>> {
        let system = self.render_system(PromptKind::PfasAnalysis, analysis_example())?;
        let human = PromptTemplate::new("analysis_human", ANALYSIS_HUMAN_TEMPLATE).render(&HashMap::from([
            ("material", query.material_name.clone()),
            ("manufacturer", query.manufacturer_name.clone()),
            ("usecase", query.work_content.clone()),
            ("chemical_composition", format_chemical_list(chemicals)),
            ("additional_info", additional_info.unwrap_or("None").to_string()),
        ]))?;

        process_debug!(ProcessId::current(), "Invoking analysis stage");
        let outcome = match self.call_function::<MaterialInfo>(system, human).await {
            StageOutcome::Completed { value, usage } => StageOutcome::Completed {
                value: value.normalized(),
                usage,
            },
            degraded => degraded,
        };

        match &outcome {
            StageOutcome::Completed { value, .. } if value.decision.is_none() => {
                process_warn!(
                    ProcessId::current(),
                    "⚠️ Analysis for {} returned no decision",
                    query.material_name
                );
            }
            StageOutcome::Completed { value, .. } => {
                process_info!(ProcessId::current(), "📋 Analysis result received: {}", value.pfas_status());
            }
            StageOutcome::Degraded { reason } => {
                process_error!(ProcessId::current(), "❌ Analysis failed for {}: {}", query.material_name, reason);
            }
        }
        Ok(outcome)
    }

    fn render_system(&self, kind: PromptKind, example: String) -> AnalyzerResult<String> {
        self.prompts.get(kind).render(&HashMap::from([("example", example)]))
    }

    async fn call_function<T: FunctionSchema>(&self, system: String, human: String) -> StageOutcome<T> {
        let request = FunctionCallRequest {
            messages: vec![ChatMessage::system(system), ChatMessage::user(human)],
            function: T::function_definition(),
        };

        let response = match self.llm.complete_function(request).await {
            Ok(response) => response,
            Err(reason) => return StageOutcome::Degraded { reason },
        };

        match T::from_arguments(&response.arguments) {
            Ok(value) => StageOutcome::Completed {
                value,
                usage: self.pricing.stage_usage(response.usage),
            },
            Err(reason) => StageOutcome::Degraded { reason },
        }
    }
}

/// Render chemical names as a bracketed, quoted list: `['A', 'B']`
pub fn format_chemical_list(chemicals: &[String]) -> String {
    let quoted: Vec<String> = chemicals.iter().map(|c| format!("'{c}'")).collect();
    format!("[{}]", quoted.join(", "))
}
