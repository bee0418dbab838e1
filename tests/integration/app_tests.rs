use clap::Parser;
use dupclean::cli::Cli;
use dupclean::error::ExitCode;
use dupclean::run_app;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// An empty config file, so the user's own config never leaks into a test.
fn empty_config() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupclean.toml");
    fs::write(&path, "").unwrap();
    (dir, path)
}

fn run(args: &[&str], config: &Path) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupclean", "-q", "scan", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn duplicate_tree() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();
    dir
}

#[test]
fn test_duplicates_found_is_success() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let code = run(&[source.path().to_str().unwrap(), "-o", "json"], &config).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_no_duplicates_exit_code() {
    let (_conf, config) = empty_config();
    let source = tempdir().unwrap();
    fs::write(source.path().join("one"), "1").unwrap();
    fs::write(source.path().join("two"), "2").unwrap();

    let code = run(&[source.path().to_str().unwrap(), "-o", "csv"], &config).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_sequential_text_report() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let code = run(
        &[source.path().to_str().unwrap(), "--sequential", "--no-color"],
        &config,
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_compare_runs_both_strategies() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let code = run(
        &[source.path().to_str().unwrap(), "--compare", "-w", "2", "-o", "json"],
        &config,
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_exclusions_can_hide_all_duplicates() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let code = run(
        &[source.path().to_str().unwrap(), "-e", "txt", "-o", "json"],
        &config,
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_missing_source_is_general_error() {
    let (_conf, config) = empty_config();
    let source = tempdir().unwrap();
    let missing = source.path().join("does-not-exist");

    let err = run(&[missing.to_str().unwrap(), "-o", "json"], &config).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("does-not-exist"));
}

#[test]
fn test_no_source_is_config_error() {
    let (_conf, config) = empty_config();
    let err = run(&["-o", "json"], &config).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
}

#[test]
fn test_unknown_config_key_is_config_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupclean.toml");
    fs::write(&config, "max_scan_dept = 3\n").unwrap();
    let source = duplicate_tree();

    let err = run(&[source.path().to_str().unwrap()], &config).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
    assert!(err.to_string().contains("did you mean 'max_scan_depth'?"));
}

#[test]
fn test_source_folder_from_config_file() {
    let source = duplicate_tree();
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupclean.toml");
    fs::write(
        &config,
        format!(
            "source_folder = {:?}\nconcurrent_scan = false\n",
            source.path().to_string_lossy()
        ),
    )
    .unwrap();

    let code = run(&["-o", "json"], &config).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_backup_folder_inside_source_is_rejected() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let backup = source.path().join("backup");

    let err = run(
        &[
            source.path().to_str().unwrap(),
            "--backup-folder",
            backup.to_str().unwrap(),
            "-o",
            "json",
        ],
        &config,
    )
    .unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    // Nothing is ever moved.
    assert!(source.path().join("b.txt").exists());
}

#[test]
fn test_backup_folder_outside_source_only_plans() {
    let (_conf, config) = empty_config();
    let source = duplicate_tree();
    let backup = tempdir().unwrap();

    let code = run(
        &[
            source.path().to_str().unwrap(),
            "--backup-folder",
            backup.path().to_str().unwrap(),
            "-o",
            "json",
        ],
        &config,
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(source.path().join("a.txt").exists());
    assert!(source.path().join("b.txt").exists());
    assert_eq!(fs::read_dir(backup.path()).unwrap().count(), 0);
}
