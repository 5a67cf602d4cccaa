//! Test fixtures for webserver integration tests

use analyzer::types::{FunctionCallResponse, TokenUsage};
use shared::MaterialInfo;
use webserver::MaterialAssessment;

pub const NITROGEN: &str = "Nitrogen, Cryogenic Liquid";
pub const MATHESON: &str = "Matheson Tri-Gas, Inc.";
pub const HEAT_TREATMENT: &str = "Heat Treatment, Hipping, Annealing and Tempering";

pub const COMPOSITION_ARGS: &str = r#"{"product_name": "Nitrogen, Cryogenic Liquid", "chemicals": [{"name": "Nitrogen", "cas_no": "7727-37-9", "source": "https://pubchem.ncbi.nlm.nih.gov/compound/947"}], "confidence": 0.95}"#;
pub const ANALYSIS_ARGS: &str = r#"{"analyzed_material": "Nitrogen, Cryogenic Liquid", "composition": "Nitrogen", "analysis_method": "Literature review", "decision": "PFAS (No)", "confidence_score": 0.97, "primary_reason": "Elemental nitrogen contains no fluorine."}"#;

/// Request body used by the home page for the Nitrogen example
pub fn nitrogen_request_body() -> String {
    serde_json::json!({
        "material_name": NITROGEN,
        "manufacturer_name": MATHESON,
        "work_content": HEAT_TREATMENT,
    })
    .to_string()
}

pub fn nitrogen_material_info() -> MaterialInfo {
    MaterialInfo {
        analyzed_material: NITROGEN.to_string(),
        composition: "Nitrogen".to_string(),
        analysis_method: "Literature review".to_string(),
        decision: Some("PFAS (No)".to_string()),
        confidence: 0.97,
        ..MaterialInfo::default()
    }
}

pub fn nitrogen_assessment() -> MaterialAssessment {
    MaterialAssessment {
        result: nitrogen_material_info(),
        chemicals: vec!["Nitrogen".to_string()],
    }
}

pub fn function_response(arguments: &str, prompt_tokens: u64, completion_tokens: u64) -> FunctionCallResponse {
    FunctionCallResponse {
        function_name: String::new(),
        arguments: arguments.to_string(),
        usage: TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    }
}
