//! Local project alias mapping
//!
//! Maps aliases (or canonical names) to canonical project names. The
//! reserved key `default` names the project used when none is given.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Reserved key holding the default project.
pub const DEFAULT_KEY: &str = "default";

/// Contents of the per-directory project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub projects: BTreeMap<String, String>,
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical name of the default project, if one is set.
    pub fn default_project(&self) -> Option<&str> {
        self.projects.get(DEFAULT_KEY).map(String::as_str)
    }

    pub fn set_default(&mut self, canonical: impl Into<String>) {
        self.projects.insert(DEFAULT_KEY.to_string(), canonical.into());
    }

    /// Substitute `candidate` through the mapping.
    ///
    /// Exactly one level of indirection: if the mapped value is itself a
    /// key, it is not followed.
    pub fn resolve_alias<'a>(&'a self, candidate: &'a str) -> &'a str {
        self.projects
            .get(candidate)
            .map(String::as_str)
            .unwrap_or(candidate)
    }

    /// Map `alias` to `canonical`, overwriting any previous value.
    ///
    /// Returns `true` when the project also became the default because no
    /// default existed yet.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) -> Result<bool, DomainError> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(DomainError::EmptyIdentifier);
        }
        if alias == DEFAULT_KEY {
            return Err(DomainError::ReservedAlias(alias.to_string()));
        }
        self.projects.insert(alias.to_string(), canonical.to_string());

        if self.default_project().is_none() {
            self.set_default(canonical);
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove a key. The default entry is left alone unless `key` is `default`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.projects.remove(key)
    }

    /// Alias entries, excluding the default.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.projects
            .iter()
            .filter(|(k, _)| k.as_str() != DEFAULT_KEY)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_config_when_adding_alias_then_sets_default() {
        let mut config = ProjectConfig::new();

        let became_default = config.add_alias("prod", "acme-prod").unwrap();

        assert!(became_default);
        assert_eq!(config.default_project(), Some("acme-prod"));
        assert_eq!(config.resolve_alias("prod"), "acme-prod");
    }

    #[test]
    fn given_existing_default_when_adding_second_alias_then_default_unchanged() {
        let mut config = ProjectConfig::new();
        config.add_alias("prod", "acme-prod").unwrap();

        let became_default = config.add_alias("staging", "acme-staging").unwrap();

        assert!(!became_default);
        assert_eq!(config.default_project(), Some("acme-prod"));
    }

    #[test]
    fn given_alias_chain_when_resolving_then_follows_one_level_only() {
        let mut config = ProjectConfig::new();
        config.projects.insert("a".into(), "b".into());
        config.projects.insert("b".into(), "c".into());

        assert_eq!(config.resolve_alias("a"), "b");
    }

    #[test]
    fn given_unknown_key_when_resolving_then_returns_candidate() {
        let config = ProjectConfig::new();
        assert_eq!(config.resolve_alias("acme"), "acme");
    }

    #[test]
    fn given_reserved_key_when_adding_alias_then_rejects() {
        let mut config = ProjectConfig::new();

        let err = config.add_alias("default", "acme").unwrap_err();

        assert!(matches!(err, DomainError::ReservedAlias(_)));
        assert!(config.is_empty());
    }

    #[test]
    fn given_blank_alias_when_adding_then_rejects() {
        let mut config = ProjectConfig::new();
        assert!(matches!(
            config.add_alias("  ", "acme"),
            Err(DomainError::EmptyIdentifier)
        ));
    }

    #[test]
    fn given_aliases_when_listing_then_default_is_excluded() {
        let mut config = ProjectConfig::new();
        config.add_alias("prod", "acme-prod").unwrap();
        config.add_alias("dev", "acme-dev").unwrap();

        let aliases: Vec<_> = config.aliases().collect();

        assert_eq!(aliases, vec![("dev", "acme-dev"), ("prod", "acme-prod")]);
    }

    #[test]
    fn given_alias_pointing_at_default_when_removed_then_default_kept() {
        let mut config = ProjectConfig::new();
        config.add_alias("prod", "acme-prod").unwrap();

        assert_eq!(config.remove("prod").as_deref(), Some("acme-prod"));
        assert_eq!(config.default_project(), Some("acme-prod"));
    }

    #[test]
    fn given_json_without_projects_key_when_parsing_then_empty() {
        let config: ProjectConfig = serde_json::from_str("{}").unwrap();
        assert!(config.is_empty());
    }
}
