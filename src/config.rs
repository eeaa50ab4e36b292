use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

use crate::{
    error::MuseTagError,
    properties::RelationDirection,
    syntax::{
        modifier::{is_modifier_name_char, is_reserved_property, RelationTable},
        DEFAULT_MARKER,
    },
};

/// Parser settings, usually read from a `musetag.toml`:
///
/// ```toml
/// marker = "@"
/// implicit_occurrences = true
///
/// [relations]
/// RulerOf = "parent"
/// SubjectOf = "child"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Marker character; a run of two to four opens an annotation.
    pub marker: char,
    /// Whether bare mentions of declared names are recorded as implicit occurrences.
    pub implicit_occurrences: bool,
    /// Extra hierarchical relation names, on top of the built-in ones.
    pub relations: BTreeMap<String, RelationDirection>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            marker: DEFAULT_MARKER,
            implicit_occurrences: true,
            relations: BTreeMap::new(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(content: &str) -> Result<ParserConfig, MuseTagError> {
        let config: ParserConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the default configuration.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<ParserConfig, MuseTagError> {
        TomlConfigProvider::new(path.as_ref().to_path_buf()).get_config()
    }

    pub fn to_toml_string(&self) -> Result<String, MuseTagError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), MuseTagError> {
        let marker = self.marker;
        if marker.is_alphanumeric()
            || marker.is_whitespace()
            || matches!(marker, '_' | '.' | '(' | ')' | '[' | ']' | '#')
        {
            return Err(MuseTagError::Config(format!(
                "'{marker}' cannot be used as the annotation marker"
            )));
        }
        for name in self.relations.keys() {
            if is_reserved_property(name) {
                return Err(MuseTagError::Config(format!(
                    "relation name '{name}' is a reserved modifier"
                )));
            }
            if name.is_empty() || !name.chars().all(is_modifier_name_char) {
                return Err(MuseTagError::Config(format!(
                    "relation name '{name}' is not a valid modifier name"
                )));
            }
        }
        Ok(())
    }

    /// The built-in relation sugar extended with the configured names.
    pub fn relation_table(&self) -> RelationTable {
        let mut table = RelationTable::default();
        table.extend(self.relations.iter());
        table
    }
}

/// Where a [ParserConfig] is read from and written to.
pub trait ConfigProvider {
    fn get_config(&self) -> Result<ParserConfig, MuseTagError>;
    fn set_config(&self, config: &ParserConfig) -> Result<(), MuseTagError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<ParserConfig, MuseTagError> {
        tracing::debug!("Attempting to read parser config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using the default configuration.");
            return Ok(ParserConfig::default());
        }
        let content = read_to_string(&self.path)?;
        ParserConfig::from_toml_str(&content)
    }

    fn set_config(&self, config: &ParserConfig) -> Result<(), MuseTagError> {
        tracing::debug!("Attempting to write parser config to: {:?}", &self.path);
        config.validate()?;
        write(&self.path, config.to_toml_string()?)?;
        Ok(())
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, MuseTagError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_empty_document_is_default() {
        let config = ParserConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.marker, '@');
        assert!(config.implicit_occurrences);
    }

    #[test]
    fn test_relations_and_marker() {
        let config = ParserConfig::from_toml_str(
            "marker = \"§\"\nimplicit_occurrences = false\n\n[relations]\nRulerOf = \"parent\"\n",
        )
        .unwrap();
        assert_eq!(config.marker, '§');
        assert!(!config.implicit_occurrences);
        assert_eq!(
            config.relation_table().direction("RulerOf"),
            Some(RelationDirection::Parent)
        );
    }

    #[test]
    fn test_invalid_markers_are_rejected() {
        for marker in ["a", "é", "ж", "7", "_", ".", "#", " ", "("] {
            let toml = format!("marker = \"{marker}\"");
            assert!(
                matches!(
                    ParserConfig::from_toml_str(&toml),
                    Err(MuseTagError::Config(_))
                ),
                "marker {marker:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_reserved_relation_names_are_rejected() {
        let result = ParserConfig::from_toml_str("[relations]\nPlace = \"child\"\n");
        assert!(matches!(result, Err(MuseTagError::Config(_))));
    }

    #[test]
    fn test_unknown_direction_is_a_serialization_error() {
        let result = ParserConfig::from_toml_str("[relations]\nRulerOf = \"sibling\"\n");
        assert!(matches!(result, Err(MuseTagError::Serialization(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ParserConfig::default();
        config
            .relations
            .insert("SubjectOf".to_string(), RelationDirection::Child);
        let text = config.to_toml_string().unwrap();
        assert_eq!(ParserConfig::from_toml_str(&text).unwrap(), config);
    }
}
