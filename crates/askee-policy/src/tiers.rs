use serde::{Deserialize, Serialize};

use crate::constants::{
    MCC_PER_CREDIT, TIER_ADMIN_CREDIT_LIMIT_CREDITS, TIER_ADMIN_MAX_CONCURRENT,
    TIER_ADVANCED_CREDIT_LIMIT_CREDITS, TIER_ADVANCED_MAX_CONCURRENT,
    TIER_BASIC_CREDIT_LIMIT_CREDITS, TIER_BASIC_MAX_CONCURRENT, TIER_EXPERT_CREDIT_LIMIT_CREDITS,
    TIER_EXPERT_MAX_CONCURRENT, WILDCARD_MODEL_ID,
};

/// Agent authorization tiers. Each tier fixes allowed models, the maximum
/// number of concurrently-admitted workloads, and a credit limit — all
/// policy, never derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentTier {
    Basic,
    Advanced,
    Expert,
    Admin,
}

impl AgentTier {
    /// Models this tier may invoke. Admin carries the wildcard `"*"`, which
    /// `allowed_models_includes` treats specially.
    pub fn allowed_models(&self) -> Vec<String> {
        let mini = "mini-text-v1".to_string();
        let llm8b = "llm-8b-instruct".to_string();
        let image = "image-gen-v1".to_string();
        match self {
            AgentTier::Basic => vec![mini],
            AgentTier::Advanced => vec![mini, llm8b],
            AgentTier::Expert => vec![mini, llm8b, image],
            AgentTier::Admin => vec![WILDCARD_MODEL_ID.to_string()],
        }
    }

    pub fn max_concurrent_workloads(&self) -> u32 {
        match self {
            AgentTier::Basic => TIER_BASIC_MAX_CONCURRENT,
            AgentTier::Advanced => TIER_ADVANCED_MAX_CONCURRENT,
            AgentTier::Expert => TIER_EXPERT_MAX_CONCURRENT,
            AgentTier::Admin => TIER_ADMIN_MAX_CONCURRENT,
        }
    }

    /// Credit limit for this tier, converted from credits to mCC.
    pub fn credit_limit_mcc(&self) -> u128 {
        let credits = match self {
            AgentTier::Basic => TIER_BASIC_CREDIT_LIMIT_CREDITS,
            AgentTier::Advanced => TIER_ADVANCED_CREDIT_LIMIT_CREDITS,
            AgentTier::Expert => TIER_EXPERT_CREDIT_LIMIT_CREDITS,
            AgentTier::Admin => TIER_ADMIN_CREDIT_LIMIT_CREDITS,
        };
        credits * MCC_PER_CREDIT
    }
}

/// Does this tier's allowed-model set cover `model_id`? The wildcard `"*"`
/// (admin tier only) matches any model id.
pub fn allowed_models_includes(tier: AgentTier, model_id: &str) -> bool {
    tier.allowed_models()
        .iter()
        .any(|m| m == WILDCARD_MODEL_ID || m == model_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_matches_any_model() {
        assert!(allowed_models_includes(AgentTier::Admin, "anything-goes"));
    }

    #[test]
    fn basic_only_matches_mini_text() {
        assert!(allowed_models_includes(AgentTier::Basic, "mini-text-v1"));
        assert!(!allowed_models_includes(AgentTier::Basic, "llm-8b-instruct"));
    }

    #[test]
    fn credit_limits_convert_to_mcc() {
        assert_eq!(AgentTier::Basic.credit_limit_mcc(), 1_000_000);
        assert_eq!(AgentTier::Admin.credit_limit_mcc(), 50_000_000);
    }
}
