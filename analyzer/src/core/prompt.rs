//! Prompt templates and their on-disk store

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use shared::logging::format_timestamp;
use tracing::{debug, warn};

use crate::error::{AnalyzerError, AnalyzerResult};

/// Human message sent with the chemical extraction prompt
pub const EXTRACTION_HUMAN_TEMPLATE: &str = "Material Name: {material}";

/// Human message sent with the PFAS analysis prompt
pub const ANALYSIS_HUMAN_TEMPLATE: &str = "Material Name: {material}, manufactured by {manufacturer}. CONTEXT: used as {usecase}. Its chemical composition is: {chemical_composition}. Additional info: {additional_info}";

/// Matches `{identifier}`; JSON like `{"name": ...}` is left alone
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").unwrap())
}

/// The two system prompts of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    ChemicalExtraction,
    PfasAnalysis,
}

impl PromptKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            PromptKind::ChemicalExtraction => "findchemicals.txt",
            PromptKind::PfasAnalysis => "pfas_analysis.txt",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            PromptKind::ChemicalExtraction => include_str!("../../prompts/findchemicals.txt"),
            PromptKind::PfasAnalysis => include_str!("../../prompts/pfas_analysis.txt"),
        }
    }
}

/// Text with `{name}` placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in placeholder_regex().captures_iter(&self.source) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Substitute every placeholder; substituted values are not rescanned
    pub fn render(&self, vars: &HashMap<&str, String>) -> AnalyzerResult<String> {
        let mut rendered = String::with_capacity(self.source.len());
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(&self.source) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let key = &caps[1];
            let value = vars.get(key).ok_or_else(|| AnalyzerError::TemplateError {
                template: self.name.clone(),
                variable: key.to_string(),
            })?;

            rendered.push_str(&self.source[last..whole.start]);
            rendered.push_str(value);
            last = whole.end;
        }
        rendered.push_str(&self.source[last..]);

        Ok(rendered)
    }
}

/// System prompts for both pipeline stages
#[derive(Debug, Clone)]
pub struct PromptStore {
    extraction: PromptTemplate,
    analysis: PromptTemplate,
}

impl PromptStore {
    /// Templates compiled into the binary
    pub fn builtin() -> Self {
        Self {
            extraction: PromptTemplate::new(
                PromptKind::ChemicalExtraction.file_name(),
                PromptKind::ChemicalExtraction.builtin(),
            ),
            analysis: PromptTemplate::new(
                PromptKind::PfasAnalysis.file_name(),
                PromptKind::PfasAnalysis.builtin(),
            ),
        }
    }

    /// Read templates from `dir`, falling back to the built-in text per missing file
    pub async fn load(dir: &Path) -> AnalyzerResult<Self> {
        Ok(Self {
            extraction: Self::load_one(dir, PromptKind::ChemicalExtraction).await?,
            analysis: Self::load_one(dir, PromptKind::PfasAnalysis).await?,
        })
    }

    async fn load_one(dir: &Path, kind: PromptKind) -> AnalyzerResult<PromptTemplate> {
        let path = dir.join(kind.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(timestamp = format_timestamp(), "📄 Loaded prompt template {}", path.display());
                Ok(PromptTemplate::new(kind.file_name(), text))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    timestamp = format_timestamp(),
                    "Prompt template {} not found, using built-in text",
                    path.display()
                );
                Ok(PromptTemplate::new(kind.file_name(), kind.builtin()))
            }
            Err(e) => Err(AnalyzerError::IoError(e)),
        }
    }

    pub fn get(&self, kind: PromptKind) -> &PromptTemplate {
        match kind {
            PromptKind::ChemicalExtraction => &self.extraction,
            PromptKind::PfasAnalysis => &self.analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let template = PromptTemplate::new("human", ANALYSIS_HUMAN_TEMPLATE);
        let rendered = template
            .render(&vars(&[
                ("material", "PTFE tape"),
                ("manufacturer", "Not Available"),
                ("usecase", "sealing"),
                ("chemical_composition", "['Polytetrafluoroethylene']"),
                ("additional_info", "None"),
            ]))
            .unwrap();

        assert_eq!(
            rendered,
            "Material Name: PTFE tape, manufactured by Not Available. CONTEXT: used as sealing. \
             Its chemical composition is: ['Polytetrafluoroethylene']. Additional info: None"
        );
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let template = PromptTemplate::new("human", EXTRACTION_HUMAN_TEMPLATE);
        match template.render(&HashMap::new()) {
            Err(AnalyzerError::TemplateError { template, variable }) => {
                assert_eq!(template, "human");
                assert_eq!(variable, "material");
            }
            other => panic!("expected template error, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_json_braces_untouched() {
        let template = PromptTemplate::new("sys", r#"Example: {"name": "x"} then {example} and {Upper}"#);
        let rendered = template.render(&vars(&[("example", "{\"k\": 1}")])).unwrap();

        assert_eq!(rendered, r#"Example: {"name": "x"} then {"k": 1} and {Upper}"#);
    }

    #[test]
    fn test_builtin_templates_only_need_example() {
        let store = PromptStore::builtin();
        assert_eq!(store.get(PromptKind::ChemicalExtraction).placeholders(), vec!["example"]);
        assert_eq!(store.get(PromptKind::PfasAnalysis).placeholders(), vec!["example"]);
    }

    #[tokio::test]
    async fn test_load_prefers_directory_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("findchemicals.txt"), "Custom {example}")
            .await
            .unwrap();

        let store = PromptStore::load(dir.path()).await.unwrap();

        let extraction = store
            .get(PromptKind::ChemicalExtraction)
            .render(&vars(&[("example", "{}")]))
            .unwrap();
        assert_eq!(extraction, "Custom {}");
        assert_eq!(
            store.get(PromptKind::PfasAnalysis),
            PromptStore::builtin().get(PromptKind::PfasAnalysis)
        );
    }
}
