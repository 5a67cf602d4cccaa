//! Per-model token pricing used for cost accounting

use shared::StageUsage;

use crate::types::TokenUsage;

/// USD price per 1K tokens for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl CostModel {
    /// Price for a model name; unknown models are free
    pub fn for_model(model_name: &str) -> Self {
        let name = model_name.trim().to_ascii_lowercase();

        // Longest prefixes first
        let (input_cost_per_1k, output_cost_per_1k) = if name.starts_with("gpt-4o-mini") {
            (0.000165, 0.00066)
        } else if name.starts_with("gpt-4o") {
            (0.005, 0.015)
        } else if name.starts_with("gpt-4-turbo") || name.starts_with("gpt-4-1106") || name.starts_with("gpt-4-0125") {
            (0.01, 0.03)
        } else if name.starts_with("gpt-4-32k") {
            (0.06, 0.12)
        } else if name.starts_with("gpt-4") {
            (0.03, 0.06)
        } else if name.starts_with("gpt-35-turbo-16k") || name.starts_with("gpt-3.5-turbo-16k") {
            (0.003, 0.004)
        } else if name.starts_with("gpt-35-turbo") || name.starts_with("gpt-3.5-turbo") {
            (0.0015, 0.002)
        } else {
            (0.0, 0.0)
        };

        Self {
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }

    pub fn calculate_cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.input_cost_per_1k
            + (completion_tokens as f64 / 1000.0) * self.output_cost_per_1k
    }

    /// Stage accounting for a provider-reported token count
    pub fn stage_usage(&self, usage: TokenUsage) -> StageUsage {
        StageUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            cost: self.calculate_cost(usage.prompt_tokens, usage.completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt4_pricing() {
        let model = CostModel::for_model("gpt-4");
        let cost = model.calculate_cost(1000, 500);
        assert!((cost - 0.06).abs() < 1e-9);
    }

    #[test]
    fn test_prefix_matching_prefers_specific_models() {
        assert_eq!(CostModel::for_model("gpt-4-32k-0613").input_cost_per_1k, 0.06);
        assert_eq!(CostModel::for_model("GPT-4o").input_cost_per_1k, 0.005);
        assert_eq!(CostModel::for_model("gpt-35-turbo").output_cost_per_1k, 0.002);
    }

    #[test]
    fn test_unknown_model_costs_nothing() {
        let usage = CostModel::for_model("llama-3").stage_usage(TokenUsage {
            prompt_tokens: 1200,
            completion_tokens: 300,
            total_tokens: 1500,
        });

        assert_eq!(usage.total_tokens, 1500);
        assert_eq!(usage.cost, 0.0);
    }
}
