use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::lock::ReleaseLock;
use crate::version::Version;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub aur: AurConfig,

    #[serde(default)]
    pub container: ContainerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Version record, relative to the project root
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    #[serde(default = "default_version_key")]
    pub version_key: String,

    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    /// Directories removed by the workspace cleaner. Derived from `name` when
    /// unset.
    pub clean_dirs: Option<Vec<PathBuf>>,

    pub lock_file: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version_file: default_version_file(),
            version_key: default_version_key(),
            release_branch: default_release_branch(),
            clean_dirs: None,
            lock_file: None,
        }
    }
}

impl ProjectConfig {
    pub fn clean_dirs(&self) -> Vec<PathBuf> {
        if let Some(dirs) = &self.clean_dirs {
            return dirs.clone();
        }

        let egg_info = format!("{}.egg-info", self.name);
        vec![
            PathBuf::from("dist"),
            PathBuf::from("tmp"),
            PathBuf::from(&egg_info),
            Path::new("src").join(&egg_info),
            Path::new("src").join(&self.name).join("tmp"),
        ]
    }

    pub fn lock_file(&self) -> PathBuf {
        self.lock_file
            .clone()
            .unwrap_or_else(|| ReleaseLock::default_path(&self.name))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VcsConfig {
    pub remote: String,

    /// Source tarball location; `{version}` is replaced with the new version
    pub tarball_url: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            tarball_url: "https://github.com/jopohl/urh/tarball/v{version}".to_string(),
        }
    }
}

impl VcsConfig {
    pub fn tarball_url(&self, version: &Version) -> String {
        self.tarball_url.replace("{version}", &version.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    pub enabled: bool,

    /// Upload tool that must be on PATH before a release starts
    pub tool: String,

    /// Command building the source distribution, run in the project root
    pub build: Vec<String>,

    pub dist_dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tool: "twine".to_string(),
            build: vec![
                "python".to_string(),
                "setup.py".to_string(),
                "sdist".to_string(),
            ],
            dist_dir: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AurConfig {
    pub enabled: bool,
    pub repository: String,

    /// Directory the repository clones into
    pub package: String,

    pub workdir: Option<PathBuf>,
}

impl Default for AurConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repository: "ssh://aur@aur.archlinux.org/urh.git".to_string(),
            package: "urh".to_string(),
            workdir: None,
        }
    }
}

impl AurConfig {
    pub fn workdir(&self) -> PathBuf {
        self.workdir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("aur"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub enabled: bool,
    pub image: String,

    /// Build context holding the Dockerfile, relative to the project root
    pub context: PathBuf,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: "jopohl/urh".to_string(),
            context: PathBuf::from("data"),
        }
    }
}

fn default_name() -> String {
    "urh".to_string()
}

fn default_version_file() -> PathBuf {
    PathBuf::from("src/urh/version.py")
}

fn default_version_key() -> String {
    "VERSION".to_string()
}

fn default_release_branch() -> String {
    "master".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the user-wide configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("shipwright.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/shipwright.toml"))
    }

    /// Load the project configuration, falling back to the user-wide file
    pub fn locate(project_root: &Path, config: &Path) -> Result<Self> {
        let project_path = project_root.join(config);
        if project_path.exists() {
            tracing::debug!("Loading configuration from {}", project_path.display());
            return Self::load(&project_path);
        }

        let user_path = Self::default_path();
        tracing::debug!("Loading configuration from {}", user_path.display());
        Self::load(&user_path)
    }

    /// Merge command line overrides into the configuration
    pub fn merge_with_args(&mut self, args: &Args) {
        if args.skip_index {
            self.index.enabled = false;
        }

        if args.skip_aur {
            self.aur.enabled = false;
        }

        if args.skip_container {
            self.container.enabled = false;
        }

        if let Some(branch) = &args.release_branch {
            self.project.release_branch = branch.clone();
        }
    }
}
