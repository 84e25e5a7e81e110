//! Coverage for config parsing, file loading and env overrides.

use std::fs;
use std::path::PathBuf;

use ideaforge::config::Config;
use ideaforge::providers::SamplingConfig;

#[test]
fn parse_minimal_config() {
    let config = match Config::from_toml("log_level = \"debug\"\n") {
        Ok(config) => config,
        Err(err) => panic!("minimal config should parse: {err}"),
    };
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.model.name, "gemini-2.5-flash");
    assert_eq!(config.generation, SamplingConfig::GENERATION);
    assert_eq!(config.refinement, SamplingConfig::REFINEMENT);
}

#[test]
fn parse_full_config() {
    let toml_str = r#"
log_level = "warn"

[model]
name = "gemini-2.5-pro"
base_url = "http://localhost:8080/v1beta"

[credentials]
api_key_env = "MY_GEMINI_KEY"

[generation]
temperature = 0.9
top_k = 20

[refinement]
temperature = 0.2
top_p = 0.8

[output]
dir = "out"
log_dir = "out/logs"
"#;
    let config = match Config::from_toml(toml_str) {
        Ok(config) => config,
        Err(err) => panic!("full config should parse: {err}"),
    };
    assert_eq!(config.model.name, "gemini-2.5-pro");
    assert_eq!(config.model.base_url, "http://localhost:8080/v1beta");
    assert_eq!(config.credentials.api_key_env, "MY_GEMINI_KEY");
    assert_eq!(config.generation.top_k, Some(20));
    assert_eq!(config.generation.top_p, None);
    assert_eq!(config.refinement.top_p, Some(0.8));
    assert_eq!(config.output.dir, PathBuf::from("out"));

    let plan = config.sampling();
    assert_eq!(plan.generation, config.generation);
    assert_eq!(plan.refinement, config.refinement);
}

#[test]
fn wrong_field_type_is_rejected() {
    assert!(Config::from_toml("[model]\nname = 42\n").is_err());
}

#[test]
fn load_with_reads_file_then_applies_env() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("ideaforge.toml");
    fs::write(&path, "[model]\nname = \"from-file\"\n").expect("should write config");
    let path_str = path.display().to_string();

    let config = Config::load_with(|key| match key {
        "IDEAFORGE_CONFIG_PATH" => Some(path_str.clone()),
        "IDEAFORGE_OUTPUT_DIR" => Some("/tmp/ideaforge-out".to_owned()),
        "IDEAFORGE_TEMPERATURE" => Some("0.3".to_owned()),
        _ => None,
    });
    let config = match config {
        Ok(config) => config,
        Err(err) => panic!("config should load: {err}"),
    };
    assert_eq!(config.model.name, "from-file");
    assert_eq!(config.output.dir, PathBuf::from("/tmp/ideaforge-out"));
    assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
}

#[test]
fn env_override_beats_file_value() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("custom.toml");
    fs::write(&path, "[model]\nname = \"from-file\"\n").expect("should write config");
    let path_str = path.display().to_string();

    let config = Config::load_with(|key| match key {
        "IDEAFORGE_CONFIG_PATH" => Some(path_str.clone()),
        "IDEAFORGE_MODEL" => Some("from-env".to_owned()),
        "IDEAFORGE_API_KEY_ENV" => Some("OTHER_KEY".to_owned()),
        _ => None,
    })
    .expect("config should load");
    assert_eq!(config.model.name, "from-env");
    assert_eq!(config.credentials.api_key_env, "OTHER_KEY");
}

#[test]
fn missing_file_yields_defaults() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path_str = tmp.path().join("absent.toml").display().to_string();

    let config = Config::load_with(|key| (key == "IDEAFORGE_CONFIG_PATH").then(|| path_str.clone()))
        .expect("missing file should not fail");
    assert_eq!(config, Config::default());
}

#[test]
fn malformed_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("broken.toml");
    fs::write(&path, "log_level = [").expect("should write config");
    let path_str = path.display().to_string();

    let result = Config::load_with(|key| (key == "IDEAFORGE_CONFIG_PATH").then(|| path_str.clone()));
    assert!(result.is_err());
}
