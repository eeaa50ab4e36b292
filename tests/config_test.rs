use tempfile::tempdir;
use test_log::test;

use musetag_core::{
    config::{ConfigProvider, ParserConfig, TomlConfigProvider},
    properties::RelationDirection,
    MuseTagError, MuseTagParser,
};

mod common;
use common::write_config;

#[test]
fn missing_config_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let config = ParserConfig::from_toml_file(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ParserConfig::default());
}

#[test]
fn config_file_drives_the_parser() {
    let dir = tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
marker = "%"
implicit_occurrences = false

[relations]
RulerOf = "parent"
VassalOf = "child"
"#,
    );
    let config = ParserConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.marker, '%');

    let parser = MuseTagParser::new(config);
    let result = parser.parse("%%Emperor.RulerOf(%%Empire) %%Duke.VassalOf(Emperor). Emperor waves.");
    assert!(result.entity("Empire").unwrap().has_parent("Emperor"));
    assert!(result.entity("Duke").unwrap().has_parent("Emperor"));
    assert_eq!(result.entity("Emperor").unwrap().occurrences.len(), 1);
    assert_eq!(result.clean_text, "Emperor Duke. Emperor waves.");
}

#[test]
fn invalid_config_files_are_errors() {
    let dir = tempdir().unwrap();
    let path = write_config(&dir, "marker = \"a\"\n");
    assert!(matches!(
        ParserConfig::from_toml_file(&path),
        Err(MuseTagError::Config(_))
    ));

    let path = write_config(&dir, "[relations]\nAlias = \"child\"\n");
    assert!(matches!(
        ParserConfig::from_toml_file(&path),
        Err(MuseTagError::Config(_))
    ));

    let path = write_config(&dir, "marker = ");
    assert!(matches!(
        ParserConfig::from_toml_file(&path),
        Err(MuseTagError::Serialization(_))
    ));
}

#[test]
fn provider_round_trips_config() {
    let dir = tempdir().unwrap();
    let provider = TomlConfigProvider::new(dir.path().join("musetag.toml"));

    let mut config = ParserConfig::default();
    config
        .relations
        .insert("SubjectOf".to_string(), RelationDirection::Child);
    provider.set_config(&config).unwrap();

    assert_eq!(provider.get_config().unwrap(), config);
}

#[test]
fn provider_refuses_to_store_invalid_config() {
    let dir = tempdir().unwrap();
    let provider = TomlConfigProvider::new(dir.path().join("musetag.toml"));
    let config = ParserConfig {
        marker: '#',
        ..Default::default()
    };
    assert!(provider.set_config(&config).is_err());
    assert!(!provider.path().exists());
}
