use std::fs;
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tempfile::tempdir;
use tunetidy::config::{Config, ConfigError};

#[test]
fn test_layered_config_file_then_env() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tunetidy.toml");
    fs::write(
        &path,
        r#"
io_threads = 2
log_dir = "/var/log/tunetidy"

[suggester]
model = "from-file"
"#,
    )
    .unwrap();

    std::env::set_var("TUNETIDY_IO_THREADS", "16");
    std::env::set_var("TUNETIDY_SUGGESTER__MODEL", "from-env");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("TUNETIDY_").split("__"))
        .extract()
        .unwrap();
    let loaded = Config::load(Some(&path)).unwrap();

    std::env::remove_var("TUNETIDY_IO_THREADS");
    std::env::remove_var("TUNETIDY_SUGGESTER__MODEL");

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.suggester.model, "from-env");
    assert_eq!(config.log_dir, PathBuf::from("/var/log/tunetidy"));
    assert_eq!(loaded.io_threads, 16);
    assert_eq!(loaded.suggester.model, "from-env");
}

#[test]
fn test_load_rejects_missing_file() {
    let dir = tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_load_rejects_bad_types() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "chunk_size = \"big\"").unwrap();

    assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_rendered_config_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.toml");

    let mut config = Config::default();
    config.rename_pattern = "{title} - {artist}".to_string();
    config.ignore_patterns = vec!["*.part".to_string()];
    fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();
    assert_eq!(loaded.rename_pattern, "{title} - {artist}");
    assert_eq!(loaded.ignore_patterns, vec!["*.part"]);
}
