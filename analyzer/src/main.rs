//! Analyzer binary entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use analyzer::core::batch::{run_batch, BatchOptions};
use analyzer::services::experiment_log::{read_material_rows, ExperimentLog};
use analyzer::build_pipeline;
use shared::logging::{init_tracing, log_error, log_shutdown, log_startup, log_success};
use shared::{AppConfig, ProcessId, Query};

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "PFAS assessment of materials using an Azure OpenAI deployment")]
struct Args {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess a single material and print the result as JSON
    Query {
        /// Material or trade name
        #[arg(long)]
        material: String,

        #[arg(long)]
        manufacturer: Option<String>,

        /// What the material is used for
        #[arg(long)]
        work_content: Option<String>,

        /// Extra context; runs only the analysis stage without storing
        #[arg(long)]
        additional_info: Option<String>,
    },
    /// Re-assess materials from a CSV and write an experiment CSV
    Batch {
        /// CSV with material_id, material_name, manufacturer_id, manufacturer_name, pfas_status
        #[arg(long)]
        input: PathBuf,

        /// Experiment CSV to append to
        #[arg(long)]
        output: PathBuf,

        /// Include the manufacturer name in each query
        #[arg(long)]
        with_manufacturer: bool,

        /// Query every row, not only PENDING ones
        #[arg(long)]
        all: bool,

        /// Maximum queries in flight (defaults to NoOfThreads)
        #[arg(long)]
        concurrency: Option<usize>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let process_id = match args.command {
        Command::Query { .. } => ProcessId::init_analyzer(),
        Command::Batch { .. } => ProcessId::init_batch(),
    };

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(Some(args.log_level.as_deref().unwrap_or(&config.log_level)));

    let pipeline = build_pipeline(&config)
        .await
        .context("Failed to build query pipeline")?;

    match args.command {
        Command::Query {
            material,
            manufacturer,
            work_content,
            additional_info,
        } => {
            log_startup(process_id, &format!("query for {}", material));
            let query = Query::new(material)
                .with_manufacturer(manufacturer)
                .with_work_content(work_content)
                .with_additional_info(additional_info);

            let output = if query.additional_info.is_some() {
                let refined = pipeline.refine(&query, &[]).await?;
                match refined.into_value() {
                    Some(info) => serde_json::to_string_pretty(&info)?,
                    None => anyhow::bail!("Upstream model request failed"),
                }
            } else {
                let outcome = pipeline.execute(&query).await?;
                if !outcome.persisted {
                    log_error(process_id, "Storing result", &"record was not persisted");
                }
                serde_json::to_string_pretty(&outcome.result)?
            };
            println!("{}", output);
        }
        Command::Batch {
            input,
            output,
            with_manufacturer,
            all,
            concurrency,
            limit,
        } => {
            log_startup(process_id, &format!("batch run from {}", input.display()));
            let materials = read_material_rows(&input)
                .await
                .with_context(|| format!("Failed to read materials from {}", input.display()))?;

            let options = BatchOptions {
                include_manufacturer: with_manufacturer,
                concurrency: concurrency.unwrap_or(config.worker_threads),
                pending_only: !all,
                limit,
            };
            let log = ExperimentLog::new(output);
            let summary = run_batch(Arc::new(pipeline), materials, &options, &log).await?;

            log_success(
                process_id,
                &format!(
                    "{} of {} materials written to {}",
                    summary.completed,
                    summary.submitted,
                    log.path().display()
                ),
            );
        }
    }

    log_shutdown(process_id, "done");
    Ok(())
}
