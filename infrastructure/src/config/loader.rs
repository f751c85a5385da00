//! Loads an [`OrchestrationConfig`] by layering TOML sources through
//! `figment`: built-in defaults, then a project config file, then an
//! explicit `--config` path, then `MAOC_`-prefixed environment overrides.

use std::path::{Path, PathBuf};

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

use super::file_config::OrchestrationConfig;

const PROJECT_CONFIG_NAMES: [&str; 2] = ["maoc.toml", ".maoc.toml"];
const ENV_PREFIX: &str = "MAOC_";

/// Layers configuration sources in priority order and produces the merged
/// [`OrchestrationConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, merging (low to high priority):
    /// defaults -> project config file -> explicit `config_path` -> env.
    pub fn load(config_path: Option<&Path>) -> Result<OrchestrationConfig, Box<figment::Error>> {
        let mut figment = Figment::from(Serialized::defaults(OrchestrationConfig::default()));

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(explicit_path) = config_path {
            figment = figment.merge(Toml::file(explicit_path));
        }

        figment = figment.merge(figment::providers::Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Defaults only, bypassing any file or environment overlay.
    pub fn load_defaults() -> OrchestrationConfig {
        OrchestrationConfig::default()
    }

    /// First of `./maoc.toml`, `./.maoc.toml` that exists in the current
    /// working directory.
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Human-readable summary of the sources that would be consulted, in
    /// priority order, for operator troubleshooting.
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut sources = vec!["built-in defaults".to_string()];
        if let Some(project) = Self::project_config_path() {
            sources.push(format!("project config: {}", project.display()));
        }
        if let Some(explicit) = config_path {
            sources.push(format!("explicit --config: {}", explicit.display()));
        }
        sources.push(format!("environment: {ENV_PREFIX}*"));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_defaults_matches_domain_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(
            config.crew.max_concurrent_tasks,
            maoc_domain::crew::CrewConfig::default().max_concurrent_tasks
        );
    }

    #[test]
    fn project_config_path_is_none_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = ConfigLoader::project_config_path();
        std::env::set_current_dir(original).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn explicit_config_path_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "[voter]\nstrategy = \"unanimity\"\nmin_votes = 2\nrequire_quorum = false\nquorum_share = 0.5\n").unwrap();
        drop(file);

        let config = ConfigLoader::load(Some(&config_path)).unwrap();
        assert_eq!(config.voter.strategy, maoc_domain::vote::VotingStrategy::Unanimity);
    }

    #[test]
    fn describe_sources_always_lists_defaults_and_env() {
        let sources = ConfigLoader::describe_sources(None);
        assert_eq!(sources.first().unwrap(), "built-in defaults");
        assert!(sources.last().unwrap().starts_with("environment:"));
    }
}
