//! Type definitions for webserver

use serde::{Deserialize, Serialize};
use shared::MaterialInfo;

/// Answer to an ask request: the analysis plus the chemicals it was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAssessment {
    pub result: MaterialInfo,
    /// Stage-one chemical names, sent back by clients on refinement
    pub chemicals: Vec<String>,
}
