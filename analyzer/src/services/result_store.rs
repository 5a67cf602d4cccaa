//! File-backed result store
//!
//! Every completed query is appended to a JSON array (`data.json`) and as a
//! row to a CSV tabular log. The JSON file is rewritten in full on each
//! append; appends from this process are serialized by a mutex.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use shared::{process_debug, process_warn, LogRecord, ProcessId, StorageConfig};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::traits::ResultStore;

/// One row of the tabular query log
#[derive(Debug, Serialize)]
struct QueryLogRow<'a> {
    time: &'a str,
    material_name: &'a str,
    manufacturer_name: &'a str,
    tokens_used_for_chemical_composition: u64,
    cost_chemical_composition: f64,
    tokens_used_for_analysis: u64,
    cost_analysis: f64,
    total_cost: f64,
    chemical_composition: String,
    #[serde(rename = "PFAS_status")]
    pfas_status: &'a str,
}

impl<'a> QueryLogRow<'a> {
    fn from_record(record: &'a LogRecord) -> Self {
        Self {
            time: &record.timestamp,
            material_name: &record.material,
            manufacturer_name: &record.manufacturer,
            tokens_used_for_chemical_composition: record.tokens_used_for_chemical_composition,
            cost_chemical_composition: record.cost_chemical_composition,
            tokens_used_for_analysis: record.tokens_used_for_analysis,
            cost_analysis: record.cost_analysis,
            total_cost: record.total_cost,
            chemical_composition: record
                .chemical_composition
                .as_ref()
                .map(|c| c.chemical_names().join(";"))
                .unwrap_or_default(),
            pfas_status: record.pfas_status.as_deref().unwrap_or_default(),
        }
    }
}

/// Real result store writing `data.json` and the CSV query log
pub struct FileResultStore {
    json_path: PathBuf,
    csv_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileResultStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self::with_paths(storage.json_log_path(), storage.csv_log_path())
    }

    pub fn with_paths(json_path: PathBuf, csv_path: PathBuf) -> Self {
        Self {
            json_path,
            csv_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    async fn append_json(&self, record: &LogRecord) -> AnalyzerResult<()> {
        let mut entries: Vec<Value> = match fs::read_to_string(&self.json_path).await {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                process_warn!(ProcessId::current(), "data.json not found, creating a new one");
                Vec::new()
            }
            Err(e) => return Err(AnalyzerError::IoError(e)),
        };

        entries.push(serde_json::to_value(record)?);

        ensure_parent(&self.json_path).await?;
        fs::write(&self.json_path, serde_json::to_string_pretty(&entries)?).await?;
        Ok(())
    }

    async fn append_csv(&self, record: &LogRecord) -> AnalyzerResult<()> {
        ensure_parent(&self.csv_path).await?;
        let write_header = !fs::try_exists(&self.csv_path).await.unwrap_or(false);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(Vec::new());
        writer.serialize(QueryLogRow::from_record(record))?;
        let bytes = writer.into_inner().map_err(|e| AnalyzerError::StorageError {
            message: format!("Failed to flush CSV row: {}", e),
        })?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn append(&self, record: &LogRecord) -> AnalyzerResult<()> {
        let _guard = self.write_lock.lock().await;

        self.append_json(record).await?;
        self.append_csv(record).await?;

        process_debug!(
            ProcessId::current(),
            "💾 Results stored in {} and {}",
            self.json_path.display(),
            self.csv_path.display()
        );
        Ok(())
    }
}

pub(crate) async fn ensure_parent(path: &Path) -> AnalyzerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}
