use clap::Parser;
use dupescan::cli::{Cli, Commands, OutputFormat};
use dupescan::config::Config;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 0);
    assert_eq!(config.output, OutputFormat::Text);
    assert!(config.exclude.is_empty());
}

#[test]
fn test_config_file_layer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
io_threads = 2
output = "json"
output_file = "report.json"
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.output_file, Some(PathBuf::from("report.json")));
}

#[test]
fn test_cli_wins_over_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "output = \"json\"\nexclude = [\"/cfg\"]").unwrap();

    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    let cli = Cli::try_parse_from(["dupescan", "scan", ".", "--output", "text", "-x", "/cli"])
        .unwrap();
    let Commands::Scan(args) = &cli.command;
    config.merge_scan_args(args);

    assert_eq!(config.output, OutputFormat::Text);
    assert_eq!(config.exclude, vec![PathBuf::from("/cfg"), PathBuf::from("/cli")]);
}
