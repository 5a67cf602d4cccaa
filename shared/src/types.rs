//! Core shared types: query inputs, structured LLM outputs and log records

use chrono::Local;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Placeholder used when an optional query field is not supplied
pub const NOT_AVAILABLE: &str = "Not Available";

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identifies which binary is emitting logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// HTTP service
    WebServer,
    /// One-off CLI query
    Analyzer,
    /// Offline batch experiment run
    Batch,
}

impl ProcessId {
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    pub fn init_analyzer() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Analyzer)
    }

    pub fn init_batch() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Batch)
    }

    /// Current process ID; library code used without an init call reports as the analyzer
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Analyzer)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::WebServer => write!(f, "webserver"),
            ProcessId::Analyzer => write!(f, "analyzer"),
            ProcessId::Batch => write!(f, "batch"),
        }
    }
}

/// A single material lookup request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub material_name: String,
    #[serde(default = "not_available")]
    pub manufacturer_name: String,
    #[serde(default = "not_available")]
    pub work_content: String,
    #[serde(default)]
    pub additional_info: Option<String>,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl Query {
    pub fn new(material_name: impl Into<String>) -> Self {
        Self {
            material_name: material_name.into(),
            manufacturer_name: not_available(),
            work_content: not_available(),
            additional_info: None,
        }
    }

    /// Set manufacturer, keeping the placeholder when `None` or blank
    pub fn with_manufacturer(mut self, manufacturer: Option<impl Into<String>>) -> Self {
        if let Some(name) = manufacturer.map(Into::into).filter(|n| !n.trim().is_empty()) {
            self.manufacturer_name = name;
        }
        self
    }

    /// Set the use case / work content, keeping the placeholder when `None` or blank
    pub fn with_work_content(mut self, work_content: Option<impl Into<String>>) -> Self {
        if let Some(content) = work_content.map(Into::into).filter(|c| !c.trim().is_empty()) {
            self.work_content = content;
        }
        self
    }

    pub fn with_additional_info(mut self, info: Option<impl Into<String>>) -> Self {
        self.additional_info = info.map(Into::into);
        self
    }
}

/// One chemical constituent of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChemicalInfo {
    /// Name of the chemical
    pub name: String,
    /// CAS number of the chemical
    #[serde(default)]
    pub cas_no: String,
    /// Source for this piece of information, will be a hyperlink
    #[serde(default)]
    pub source: String,
}

/// Chemical composition of a named product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChemicalComposition {
    /// Name of the product specified
    #[serde(default)]
    pub product_name: String,
    /// List of chemicals present in the product
    #[serde(default)]
    pub chemicals: Vec<ChemicalInfo>,
    /// Confidence score of the result
    #[serde(default)]
    pub confidence: f64,
}

impl ChemicalComposition {
    /// Chemical names in the order the model returned them
    pub fn chemical_names(&self) -> Vec<String> {
        self.chemicals.iter().map(|c| c.name.clone()).collect()
    }
}

/// PFAS analysis of a material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MaterialInfo {
    /// Name of the material that was analyzed
    #[serde(default)]
    pub analyzed_material: String,
    /// Chemical composition of the material
    #[serde(default)]
    pub composition: String,
    /// How its PFAS analysis was conducted - methods, sources
    #[serde(default)]
    pub analysis_method: String,
    /// Decision of whether the material is PFAS compliant or not: PFAS (Yes/No)
    #[serde(default)]
    pub decision: Option<String>,
    /// Confidence score of response
    #[serde(default, alias = "confidence_score")]
    pub confidence: f64,
    /// Confidence level of response between low, medium and high
    #[serde(default)]
    pub confidence_level: String,
    /// Primary reasoning of response content
    #[serde(default)]
    pub primary_reason: String,
    /// Secondary reasoning of response content
    #[serde(default)]
    pub secondary_reason: Option<String>,
    /// Evidence supporting the response given
    #[serde(default)]
    pub evidence: Vec<String>,
    /// List of health problems that could potentially be attached to the product
    #[serde(default)]
    pub health_problems: Vec<String>,
    /// Recommendation of what to do with the material with regards to its PFAS compliance
    #[serde(default)]
    pub recommendation: String,
    /// Suggestion of what to do with the material with regards to its PFAS compliance
    #[serde(default)]
    pub suggestion: Option<String>,
    /// Limitations and uncertainties of material and its PFAS compliance based on the data that could be looked up
    #[serde(default)]
    pub limitations_and_uncertainties: Option<String>,
}

impl MaterialInfo {
    /// Result returned when the analysis stage could not produce an answer
    pub fn undetermined(material_name: &str) -> Self {
        Self {
            analyzed_material: material_name.to_string(),
            ..Self::default()
        }
    }

    /// Treat blank decisions as absent
    pub fn normalized(mut self) -> Self {
        if self.decision.as_deref().is_some_and(|d| d.trim().is_empty()) {
            self.decision = None;
        }
        self
    }

    pub fn pfas_status(&self) -> PfasStatus {
        PfasStatus::from_decision(self.decision.as_deref())
    }
}

/// Normalized PFAS decision used in experiment exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PfasStatus {
    Yes,
    No,
    Other(String),
    Unknown,
}

impl PfasStatus {
    pub fn from_decision(decision: Option<&str>) -> Self {
        match decision.map(str::trim) {
            Some("PFAS (Yes)") => PfasStatus::Yes,
            Some("PFAS (No)") => PfasStatus::No,
            Some(other) if !other.is_empty() => PfasStatus::Other(other.to_string()),
            _ => PfasStatus::Unknown,
        }
    }
}

impl fmt::Display for PfasStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PfasStatus::Yes => write!(f, "YES"),
            PfasStatus::No => write!(f, "NO"),
            PfasStatus::Other(text) => write!(f, "{text}"),
            PfasStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Token and dollar accounting for one LLM stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

impl StageUsage {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.total_tokens == 0 && self.cost == 0.0
    }
}

/// Why an LLM request did not yield a usable response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Authentication failed (invalid API key)
    AuthenticationFailed,
    /// Rate limit exceeded
    RateLimitExceeded,
    /// Invalid request format or parameters
    InvalidRequest(String),
    /// Content policy violation
    ContentPolicyViolation(String),
    /// Network/connection error
    NetworkError(String),
    /// Server error from provider
    ServerError(String),
    /// Request timeout
    Timeout,
    /// Service temporarily unavailable
    ServiceUnavailable,
    /// Response arrived but did not carry the expected function call
    MalformedResponse(String),
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ApiFailure::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            ApiFailure::ContentPolicyViolation(msg) => write!(f, "content policy violation: {msg}"),
            ApiFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            ApiFailure::ServerError(msg) => write!(f, "server error: {msg}"),
            ApiFailure::Timeout => write!(f, "request timed out"),
            ApiFailure::ServiceUnavailable => write!(f, "service unavailable"),
            ApiFailure::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

/// Append-only record of one completed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub timestamp: String,
    pub duration: f64,
    pub material: String,
    pub manufacturer: String,
    pub tokens_used_for_chemical_composition: u64,
    pub tokens_used_for_analysis: u64,
    pub cost_chemical_composition: f64,
    pub cost_analysis: f64,
    pub total_cost: f64,
    pub chemical_composition: Option<ChemicalComposition>,
    #[serde(rename = "PFAS_status")]
    pub pfas_status: Option<String>,
    pub result: Option<MaterialInfo>,
}

impl LogRecord {
    pub fn new(
        query: &Query,
        duration: f64,
        composition: Option<ChemicalComposition>,
        extraction: StageUsage,
        analysis: StageUsage,
        result: Option<MaterialInfo>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration,
            material: query.material_name.clone(),
            manufacturer: query.manufacturer_name.clone(),
            tokens_used_for_chemical_composition: extraction.total_tokens,
            tokens_used_for_analysis: analysis.total_tokens,
            cost_chemical_composition: extraction.cost,
            cost_analysis: analysis.cost,
            total_cost: extraction.cost + analysis.cost,
            chemical_composition: composition,
            pfas_status: result.as_ref().and_then(|r| r.decision.clone()),
            result,
        }
    }
}
