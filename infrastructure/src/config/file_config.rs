//! Raw TOML configuration shape (§6 "Configuration surface").
//!
//! Deserialized directly into the domain's own config records — there is no
//! separate "file" shadow type mirroring them field-by-field, because these
//! domain configs are already `serde`-friendly with `deny_unknown_fields` on
//! each section.

use maoc_domain::consensus::ConsensusConfig;
use maoc_domain::crew::CrewConfig;
use maoc_domain::problem::SolverConfig;
use maoc_domain::vote::VoterConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration. Swarm configuration is deliberately absent:
/// a [`maoc_domain::swarm::SwarmConfig`] is always named and constructed
/// per-swarm at call sites (`SwarmConfig::new("name", behavior)`), not a
/// singleton loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub crew: CrewConfig,
    pub voter: VoterConfig,
    pub consensus: ConsensusConfig,
    pub solver: SolverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = OrchestrationConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: OrchestrationConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.crew.max_concurrent_tasks, config.crew.max_concurrent_tasks);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
[voter]
strategy = "supermajority"
threshold = 0.75
min_votes = 3
require_quorum = true
quorum_share = 0.6

[crew]
process_mode = "parallel"
"#;
        let config: OrchestrationConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voter.min_votes, 3);
        assert_eq!(config.crew.max_concurrent_tasks, CrewConfig::default().max_concurrent_tasks);
    }

    #[test]
    fn unknown_field_in_a_section_is_rejected() {
        let toml_str = r#"
[crew]
process_mode = "sequential"
bogus_field = true
"#;
        let result: Result<OrchestrationConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }
}
