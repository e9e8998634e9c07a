use clap::Parser;
use shipwright::cli::{Args, Command, FailurePolicy, ShipwrightCli};
use shipwright::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let cli = ShipwrightCli::try_parse_from(["shipwright"]).unwrap();
    assert!(cli.command.is_none());

    let args: Args = cli.into();
    assert_eq!(args.project_root, PathBuf::from("."));
    assert_eq!(args.config, PathBuf::from(".config/shipwright.toml"));
    assert_eq!(args.on_failure, FailurePolicy::Continue);
    assert!(!args.yes);
    assert!(!args.skip_index);
    assert!(args.release_branch.is_none());
}

#[test]
fn test_subcommands() {
    let clean = ShipwrightCli::try_parse_from(["shipwright", "clean"]).unwrap();
    assert_eq!(clean.command, Some(Command::Clean));

    let bump = ShipwrightCli::try_parse_from(["shipwright", "bump", "--project-root", "/src/urh"])
        .unwrap();
    assert_eq!(bump.command, Some(Command::Bump));
    assert_eq!(bump.project_root, PathBuf::from("/src/urh"));

    let unlock = ShipwrightCli::try_parse_from(["shipwright", "unlock"]).unwrap();
    assert_eq!(unlock.command, Some(Command::Unlock));
}

#[test]
fn test_release_flags() {
    let cli = ShipwrightCli::try_parse_from([
        "shipwright",
        "-y",
        "--skip-aur",
        "--skip-container",
        "--on-failure",
        "halt",
        "--release-branch",
        "main",
    ])
    .unwrap();

    let args: Args = cli.into();
    assert!(args.yes);
    assert!(args.skip_aur);
    assert!(args.skip_container);
    assert!(!args.skip_index);
    assert_eq!(args.on_failure, FailurePolicy::Halt);
    assert_eq!(args.release_branch.as_deref(), Some("main"));
}

#[test]
fn test_invalid_policy_is_rejected() {
    assert!(ShipwrightCli::try_parse_from(["shipwright", "--on-failure", "retry"]).is_err());
}

#[test]
fn test_policy_display() {
    assert_eq!(FailurePolicy::Continue.to_string(), "continue");
    assert_eq!(FailurePolicy::Halt.to_string(), "halt");
}

#[test]
fn test_merge_with_args_overrides_config() {
    let mut config = Config::default();
    let args = Args {
        skip_index: true,
        skip_container: true,
        release_branch: Some("main".to_string()),
        ..Args::default()
    };

    config.merge_with_args(&args);

    assert!(!config.index.enabled);
    assert!(config.aur.enabled);
    assert!(!config.container.enabled);
    assert_eq!(config.project.release_branch, "main");
}

#[test]
fn test_merge_keeps_config_when_no_flags() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("shipwright.toml");
    fs::write(
        &config_path,
        "[project]\nrelease_branch = \"stable\"\n\n[container]\nenabled = false\n",
    )
    .unwrap();

    let mut config = Config::load(&config_path).unwrap();
    config.merge_with_args(&Args::default());

    assert_eq!(config.project.release_branch, "stable");
    assert!(!config.container.enabled);
    assert!(config.index.enabled);
}

#[test]
fn test_locate_prefers_project_config() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".config")).unwrap();
    fs::write(
        dir.path().join(".config/shipwright.toml"),
        "[project]\nname = \"inspectrum\"\n",
    )
    .unwrap();

    let config = Config::locate(dir.path(), &PathBuf::from(".config/shipwright.toml")).unwrap();
    assert_eq!(config.project.name, "inspectrum");
    assert!(config
        .project
        .clean_dirs()
        .contains(&PathBuf::from("inspectrum.egg-info")));
}
