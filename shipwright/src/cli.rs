use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "shipwright",
    version,
    about = "Bump the version, tag it and publish to PyPI, the AUR and Docker Hub",
    long_about = None
)]
pub struct ShipwrightCli {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Project root. A symbolic link is followed before resolving
    #[clap(long, default_value = ".", global = true)]
    pub project_root: PathBuf,

    /// Configuration file path, relative to the project root
    #[clap(long, default_value = ".config/shipwright.toml", global = true)]
    pub config: PathBuf,

    /// Start the release without asking for confirmation
    #[clap(short = 'y', long, global = true)]
    pub yes: bool,

    /// Skip building and uploading the source distribution
    #[clap(long, global = true)]
    pub skip_index: bool,

    /// Skip updating the AUR package
    #[clap(long, global = true)]
    pub skip_aur: bool,

    /// Skip building and pushing the container image
    #[clap(long, global = true)]
    pub skip_container: bool,

    /// What to do when an external step fails
    #[clap(long, default_value = "continue", global = true)]
    pub on_failure: FailurePolicy,

    /// Override the branch releases are allowed from
    #[clap(long, global = true)]
    pub release_branch: Option<String>,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remove generated build and cache directories
    Clean,

    /// Print the version the next release would get
    Bump,

    /// Remove a release lock left behind by an interrupted run
    Unlock,
}

#[derive(Debug, Clone)]
pub struct Args {
    pub project_root: PathBuf,
    pub config: PathBuf,
    pub yes: bool,
    pub skip_index: bool,
    pub skip_aur: bool,
    pub skip_container: bool,
    pub on_failure: FailurePolicy,
    pub release_branch: Option<String>,
    pub verbose: bool,
}

impl From<ShipwrightCli> for Args {
    fn from(cli: ShipwrightCli) -> Self {
        Args {
            project_root: cli.project_root,
            config: cli.config,
            yes: cli.yes,
            skip_index: cli.skip_index,
            skip_aur: cli.skip_aur,
            skip_container: cli.skip_container,
            on_failure: cli.on_failure,
            release_branch: cli.release_branch,
            verbose: cli.verbose,
        }
    }
}

impl Default for Args {
    fn default() -> Self {
        Args {
            project_root: PathBuf::from("."),
            config: PathBuf::from(".config/shipwright.toml"),
            yes: false,
            skip_index: false,
            skip_aur: false,
            skip_container: false,
            on_failure: FailurePolicy::Continue,
            release_branch: None,
            verbose: false,
        }
    }
}

/// How the release reacts to a failed external step.
///
/// `Continue` logs the failure and moves on to the next step; nothing is
/// verified. `Halt` stops at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    Continue,
    Halt,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Halt => write!(f, "halt"),
        }
    }
}
