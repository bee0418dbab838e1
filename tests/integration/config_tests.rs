use dupclean::config::{Config, ConfigError};
use dupclean::scanner::{HashAlgorithm, MaxDepth, ScanStrategy, Scanner};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.max_scan_depth, -1);
    assert!(config.concurrent_scan);
}

#[test]
fn test_config_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "dry_run = false\nmax_scan_depth = 4\n").unwrap();

    std::env::set_var("DUPCLEAN_TEST_ONLY_DRY_RUN", "true");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPCLEAN_TEST_ONLY_"))
        .extract()
        .unwrap();
    std::env::remove_var("DUPCLEAN_TEST_ONLY_DRY_RUN");

    assert!(config.dry_run);
    assert_eq!(config.max_scan_depth, 4);
}

#[test]
fn test_config_file_drives_scan() {
    let source = tempdir().unwrap();
    fs::create_dir(source.path().join("deep")).unwrap();
    fs::write(source.path().join("keep.txt"), "k").unwrap();
    fs::write(source.path().join("skip.tmp"), "s").unwrap();
    fs::write(source.path().join("deep/far.txt"), "f").unwrap();

    let conf_dir = tempdir().unwrap();
    let path = conf_dir.path().join("dupclean.toml");
    let content = format!(
        concat!(
            "source_folder = {:?}\n",
            "max_scan_depth = 1\n",
            "excluded_file_types = [\".TMP\"]\n",
            "concurrent_scan = false\n",
            "hash_algorithm = \"blake3\"\n",
        ),
        source.path().to_string_lossy()
    );
    fs::write(&path, content).unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.max_depth(), MaxDepth::Limited(1));
    assert_eq!(config.hash_algorithm, HashAlgorithm::Blake3);

    let scan_config = config.to_scan_config().unwrap();
    assert_eq!(scan_config.strategy(), ScanStrategy::Sequential);

    let mut scanner = Scanner::new(Arc::new(scan_config));
    let result = scanner.scan().unwrap();
    assert_eq!(result.len(), 1);
    assert!(result.records()[0].path.ends_with("keep.txt"));
    assert_eq!(result.records()[0].fingerprint.as_str().len(), 64);
}

#[test]
fn test_config_unknown_key_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "source_folder = \"/x\"\nconcurent_scan = true\n").unwrap();

    match Config::load(Some(&path)) {
        Err(ConfigError::UnknownKey {
            key, suggestion, ..
        }) => {
            assert_eq!(key, "concurent_scan");
            assert_eq!(suggestion.as_deref(), Some("concurrent_scan"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn test_config_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "invalid = ").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config {
        source_folder: Some(PathBuf::from("/src")),
        backup_folder: Some(PathBuf::from("/bk")),
        excluded_file_types: vec!["iso".to_string()],
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config).unwrap();
    assert!(content.contains("source_folder = \"/src\""));
    assert!(content.contains("hash_algorithm = \"md5\""));

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    let loaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();
    assert_eq!(loaded, config);
}
