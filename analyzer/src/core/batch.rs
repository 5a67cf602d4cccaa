//! Concurrent batch experiment over a list of materials

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use shared::{process_error, process_info, PfasStatus, ProcessId, Query};

use crate::core::pipeline::QueryPipeline;
use crate::error::AnalyzerResult;
use crate::services::experiment_log::{ExperimentLog, ExperimentRow, MaterialRow};
use crate::traits::{LlmClient, ResultStore};

/// How a batch run selects and queries materials
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Pass each row's manufacturer to the pipeline
    pub include_manufacturer: bool,
    /// Maximum queries in flight
    pub concurrency: usize,
    /// Skip rows whose current status is not `PENDING`
    pub pending_only: bool,
    pub limit: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            include_manufacturer: false,
            concurrency: 20,
            pending_only: true,
            limit: None,
        }
    }
}

/// Counts reported at the end of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
    pub yes: usize,
    pub no: usize,
    pub undetermined: usize,
    pub total_cost: f64,
}

impl BatchSummary {
    fn record(&mut self, status: &PfasStatus, cost: f64) {
        self.completed += 1;
        self.total_cost += cost;
        match status {
            PfasStatus::Yes => self.yes += 1,
            PfasStatus::No => self.no += 1,
            PfasStatus::Other(_) | PfasStatus::Unknown => self.undetermined += 1,
        }
    }
}

/// Select the rows a run will query
pub fn select_materials(materials: Vec<MaterialRow>, options: &BatchOptions) -> Vec<MaterialRow> {
    let selected = materials
        .into_iter()
        .filter(|row| !options.pending_only || row.is_pending());
    match options.limit {
        Some(limit) => selected.take(limit).collect(),
        None => selected.collect(),
    }
}

/// Query every selected material and append one experiment row per result
///
/// Rows are appended in completion order, not input order. A query, task
/// or log write that fails counts toward `failed` and the batch carries on.
pub async fn run_batch<L, S>(
    pipeline: Arc<QueryPipeline<L, S>>,
    materials: Vec<MaterialRow>,
    options: &BatchOptions,
    log: &ExperimentLog,
) -> AnalyzerResult<BatchSummary>
where
    L: LlmClient + 'static,
    S: ResultStore + 'static,
{
    let process_id = ProcessId::current();
    let start = Instant::now();
    let selected = select_materials(materials, options);
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

    let mut summary = BatchSummary {
        submitted: selected.len(),
        ..BatchSummary::default()
    };

    process_info!(
        process_id,
        "🚀 Running batch of {} materials (manufacturer: {}, concurrency: {})",
        selected.len(),
        options.include_manufacturer,
        options.concurrency
    );

    let mut tasks = JoinSet::new();
    for row in selected {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        let include_manufacturer = options.include_manufacturer;

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;

            let mut query = Query::new(row.material_name.clone());
            if include_manufacturer {
                query = query.with_manufacturer(Some(row.manufacturer_name.clone()));
            }

            let outcome = pipeline.execute(&query).await;
            (row, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (row, outcome) = match joined {
            Ok(joined) => joined,
            Err(e) => {
                summary.failed += 1;
                process_error!(process_id, "❌ Batch task did not finish: {}", e);
                continue;
            }
        };
        match outcome {
            Ok(outcome) => {
                let status = outcome.result.pfas_status();
                let experiment_row = ExperimentRow {
                    material_id: row.material_id,
                    manufacturer_id: row.manufacturer_id,
                    manufacturer_name: row.manufacturer_name,
                    modified_service_pfas_status: status.to_string(),
                    material_name: row.material_name,
                    current_service_pfas_status: row.pfas_status,
                };
                match log.append(&experiment_row).await {
                    Ok(()) => summary.record(&status, outcome.record.total_cost),
                    Err(e) => {
                        summary.failed += 1;
                        process_error!(
                            process_id,
                            "❌ Could not log batch result for {}: {}",
                            experiment_row.material_name,
                            e
                        );
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                process_error!(process_id, "❌ Batch query for {} failed: {}", row.material_name, e);
            }
        }
    }

    process_info!(
        process_id,
        "✅ Batch finished in {:.1}s: {} completed, {} failed, {} YES, {} NO, {} undetermined, ${:.4}",
        start.elapsed().as_secs_f64(),
        summary.completed,
        summary.failed,
        summary.yes,
        summary.no,
        summary.undetermined,
        summary.total_cost
    );

    Ok(summary)
}
