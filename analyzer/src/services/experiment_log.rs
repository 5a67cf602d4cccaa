//! CSV input and output for batch experiments

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::AnalyzerResult;
use crate::services::result_store::ensure_parent;

/// A material to re-assess, joined with its manufacturer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub material_id: String,
    pub material_name: String,
    #[serde(default)]
    pub manufacturer_id: String,
    #[serde(default)]
    pub manufacturer_name: String,
    /// Status currently stored for the material, e.g. `PENDING`
    #[serde(default)]
    pub pfas_status: String,
}

impl MaterialRow {
    pub fn is_pending(&self) -> bool {
        self.pfas_status.trim().eq_ignore_ascii_case("PENDING")
    }
}

/// Outcome of re-assessing one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRow {
    pub material_id: String,
    pub manufacturer_id: String,
    pub manufacturer_name: String,
    pub modified_service_pfas_status: String,
    pub material_name: String,
    pub current_service_pfas_status: String,
}

/// Parse a materials CSV with a header row
pub async fn read_material_rows(path: &Path) -> AnalyzerResult<Vec<MaterialRow>> {
    let bytes = fs::read(path).await?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Experiment CSV that grows by one row per finished material
pub struct ExperimentLog {
    path: PathBuf,
}

impl ExperimentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row, writing the header only when the file is new or empty
    pub async fn append(&self, row: &ExperimentRow) -> AnalyzerResult<()> {
        ensure_parent(&self.path).await?;
        let is_new = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(Vec::new());
        writer.serialize(row)?;
        writer.flush()?;
        let bytes = writer.get_ref().clone();

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read_all(&self) -> AnalyzerResult<Vec<ExperimentRow>> {
        let bytes = fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
