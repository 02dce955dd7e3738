//! Configuration management for Vertigo.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`VERTIGO__` prefix, `__` between keys, e.g.
//!    `VERTIGO__MAPPING__INDEX_ALL_FIELDS=true`)
//! 2. Config file (`vertigo.toml` by default)
//! 3. Defaults

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;

/// Process-wide mapping policy, read at type registration time.
///
/// Loaded from the `[mapping]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MappingConfig {
    /// Request a key index for every declared vertex field and for `vid`.
    #[serde(default)]
    pub index_all_fields: bool,
}

impl MappingConfig {
    pub fn load(file_prefix: &str) -> Result<Self> {
        load_section(file_prefix, "mapping")
    }
}

/// Load one section of the layered configuration, falling back to the
/// section type's defaults when the section is absent.
pub fn load_section<T>(file_prefix: &str, section: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("VERTIGO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<T>(section) {
        Ok(value) => Ok(value),
        Err(config::ConfigError::NotFound(_)) => {
            tracing::debug!(section, "Config section absent, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_config() {
        assert!(!MappingConfig::default().index_all_fields);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = MappingConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config, MappingConfig::default());
    }

    #[test]
    fn test_loads_mapping_section_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vertigo.toml"),
            "[mapping]\nindex_all_fields = true\n",
        )
        .unwrap();

        let prefix = dir.path().join("vertigo");
        let config = MappingConfig::load(prefix.to_str().unwrap()).unwrap();
        assert!(config.index_all_fields);
    }

    #[test]
    fn test_malformed_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vertigo.toml"),
            "[mapping]\nindex_all_fields = \"sometimes\"\n",
        )
        .unwrap();

        let prefix = dir.path().join("vertigo");
        assert!(MappingConfig::load(prefix.to_str().unwrap()).is_err());
    }
}
