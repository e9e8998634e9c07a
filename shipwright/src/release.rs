use anyhow::Context;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::checksum::{self, Checksums};
use crate::clean::{resolve_project_root, WorkspaceCleaner};
use crate::cli::{Args, FailurePolicy};
use crate::config::Config;
use crate::download::{Downloader, HttpDownloader};
use crate::error::{Result, ShipError};
use crate::lock::ReleaseLock;
use crate::pkgbuild::{self, PackageUpdate, PKGBUILD};
use crate::prompt::{Prompter, TerminalPrompter};
use crate::report::ReleaseReport;
use crate::runner::{CommandRunner, Invocation, StepOutcome, SystemRunner};
use crate::vcs::Git;
use crate::version::{Version, VersionRecord};

pub const GIT_ADD: &str = "git add";
pub const GIT_COMMIT: &str = "git commit";
pub const GIT_PUSH: &str = "git push";
pub const DELETE_TAGS: &str = "delete local tags";
pub const FETCH_TAGS: &str = "git fetch --tags";
pub const CREATE_TAG: &str = "git tag";
pub const PUSH_TAGS: &str = "git push --tags";
pub const SDIST: &str = "build source distribution";
pub const DIST_LIST: &str = "list distribution files";
pub const UPLOAD: &str = "upload to package index";
pub const AUR_WORKDIR: &str = "aur: prepare work directory";
pub const AUR_DOWNLOAD: &str = "aur: download tarball";
pub const AUR_CLONE: &str = "aur: clone";
pub const AUR_PKGBUILD: &str = "aur: rewrite PKGBUILD";
pub const AUR_SRCINFO: &str = "aur: makepkg --printsrcinfo";
pub const AUR_COMMIT: &str = "aur: git commit";
pub const AUR_PUSH: &str = "aur: git push";
pub const DOCKER_LOGIN: &str = "docker login";
pub const DOCKER_BUILD: &str = "docker build";
pub const DOCKER_PUSH_LATEST: &str = "docker push latest";
pub const DOCKER_PUSH_VERSION: &str = "docker push version";

/// Everything a release talks to outside its own process
pub struct Backends {
    pub runner: Box<dyn CommandRunner>,
    pub downloader: Box<dyn Downloader>,
    pub prompter: Box<dyn Prompter>,
}

impl Backends {
    pub fn system() -> Result<Self> {
        Ok(Self {
            runner: Box::new(SystemRunner),
            downloader: Box::new(HttpDownloader::new()?),
            prompter: Box::new(TerminalPrompter),
        })
    }
}

/// Runs the release pipeline for one project.
///
/// Steps run strictly in order: preconditions, lock, version bump, git
/// publish, package index, AUR, unlock, container image. Only the
/// preconditions are fatal by default; every other failed step is recorded in
/// the [`ReleaseReport`] and, unless the policy is [`FailurePolicy::Halt`],
/// the pipeline carries on.
pub struct Releaser {
    root: PathBuf,
    config: Config,
    policy: FailurePolicy,
    backends: Backends,
}

impl Releaser {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let root = resolve_project_root(&args.project_root).with_context(|| {
            format!(
                "Failed to resolve project root {}",
                args.project_root.display()
            )
        })?;

        let mut config =
            Config::locate(&root, &args.config).context("Failed to load configuration")?;

        // Merge command line overrides
        config.merge_with_args(args);

        let backends = Backends::system()?;

        Ok(Self::with_backends(root, config, args.on_failure, backends))
    }

    pub fn with_backends(
        root: PathBuf,
        config: Config,
        policy: FailurePolicy,
        backends: Backends,
    ) -> Self {
        Self {
            root,
            config,
            policy,
            backends,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.backends.prompter.as_ref()
    }

    pub fn cleaner(&self) -> WorkspaceCleaner {
        WorkspaceCleaner::new(&self.root, self.config.project.clean_dirs())
    }

    pub fn version_record(&self) -> VersionRecord {
        VersionRecord::new(
            self.root.join(&self.config.project.version_file),
            &self.config.project.version_key,
        )
    }

    /// Current version and the one the next release would get
    pub fn next_version(&self) -> Result<(Version, Version)> {
        let current = self.version_record().read()?;
        let next = current.bump()?;
        Ok((current, next))
    }

    /// Checks that must pass before anything is mutated
    pub fn check_preconditions(&self) -> Result<()> {
        if self.config.index.enabled {
            let tool = &self.config.index.tool;
            which::which(tool).map_err(|_| ShipError::MissingDependency { tool: tool.clone() })?;
            tracing::debug!("Found {} on PATH", tool);
        }

        let branch = Git::new(self.backends.runner.as_ref(), &self.root).current_branch()?;
        let expected = &self.config.project.release_branch;
        if &branch != expected {
            return Err(ShipError::WrongBranch {
                expected: expected.clone(),
                actual: branch,
            });
        }

        tracing::info!("Releasing from branch {}", branch);
        Ok(())
    }

    pub async fn run(&self) -> Result<ReleaseReport> {
        self.check_preconditions()?;

        let lock = ReleaseLock::acquire(&self.config.project.lock_file())?;

        let version = match self.bump_version() {
            Ok(version) => version,
            Err(e) => {
                // Nothing has been published yet, so the lock can go
                lock.release()?;
                return Err(e);
            }
        };

        let mut report = ReleaseReport::new(version.clone());

        self.publish_vcs(&version, &mut report)?;

        if self.config.index.enabled {
            self.publish_index(&mut report)?;
        } else {
            tracing::info!("Skipping package index upload");
        }

        if self.config.aur.enabled {
            self.publish_aur(&version, &mut report).await?;
        } else {
            tracing::info!("Skipping AUR update");
        }

        lock.release()?;

        if self.config.container.enabled {
            self.publish_container(&version, &mut report)?;
        } else {
            tracing::info!("Skipping container image");
        }

        if report.is_clean() {
            tracing::info!("Release {} completed successfully!", version);
        } else {
            tracing::warn!(
                "Release {} finished with {} failed step(s)",
                version,
                report.failures().count()
            );
        }

        Ok(report)
    }

    fn bump_version(&self) -> Result<Version> {
        let record = self.version_record();
        let current = record.read()?;
        let next = current.bump()?;
        record.write(&next)?;
        tracing::info!("Bumped version {} -> {}", current, next);
        Ok(next)
    }

    /// Record a step's outcome and apply the failure policy to it
    fn settle(
        &self,
        report: &mut ReleaseReport,
        name: &str,
        outcome: StepOutcome,
    ) -> Result<StepOutcome> {
        report.record(name, outcome.clone());
        if outcome.success() {
            return Ok(outcome);
        }

        match self.policy {
            FailurePolicy::Continue => {
                tracing::warn!("Step '{}' failed ({}), continuing", name, outcome.describe());
                Ok(outcome)
            }
            FailurePolicy::Halt => {
                tracing::error!("Step '{}' failed ({}), halting", name, outcome.describe());
                Err(ShipError::StepFailed {
                    step: name.to_string(),
                    detail: outcome.describe(),
                })
            }
        }
    }

    fn step(
        &self,
        report: &mut ReleaseReport,
        name: &str,
        invocation: Invocation,
    ) -> Result<StepOutcome> {
        tracing::info!("Running {}", invocation);
        let outcome = self.backends.runner.run(&invocation);
        self.settle(report, name, outcome)
    }

    fn publish_vcs(&self, version: &Version, report: &mut ReleaseReport) -> Result<()> {
        let git = Git::new(self.backends.runner.as_ref(), &self.root);
        let message = format!("version {version}");

        let record = self.version_record();
        let staged = record
            .path()
            .strip_prefix(&self.root)
            .unwrap_or(record.path());

        tracing::info!("Publishing version {} to git", version);
        self.settle(report, GIT_ADD, git.add(staged))?;
        self.settle(report, GIT_COMMIT, git.commit(&message))?;
        self.settle(report, GIT_PUSH, git.push())?;

        // Local tags may be stale if a tag was moved upstream
        self.settle(report, DELETE_TAGS, git.delete_local_tags())?;
        self.settle(report, FETCH_TAGS, git.fetch_tags())?;

        self.settle(report, CREATE_TAG, git.tag_annotated(&version.tag(), &message))?;
        self.settle(report, PUSH_TAGS, git.push_tags(&self.config.vcs.remote))?;
        Ok(())
    }

    fn publish_index(&self, report: &mut ReleaseReport) -> Result<()> {
        let index = &self.config.index;
        let (program, rest) = index
            .build
            .split_first()
            .ok_or_else(|| ShipError::Config("index.build must name a command".to_string()))?;

        self.step(
            report,
            SDIST,
            Invocation::new(program.as_str(), &self.root).args(rest.iter().map(String::as_str)),
        )?;

        let uploads = match self.dist_files() {
            Ok(uploads) => uploads,
            Err(e) => {
                let reason = format!("{}: {e}", self.root.join(&index.dist_dir).display());
                self.settle(report, DIST_LIST, StepOutcome::not_started(reason))?;
                return Ok(());
            }
        };
        if uploads.is_empty() {
            let reason = format!("no files in {}", index.dist_dir.display());
            self.settle(report, UPLOAD, StepOutcome::not_started(reason))?;
            return Ok(());
        }

        self.step(
            report,
            UPLOAD,
            Invocation::new(index.tool.as_str(), &self.root)
                .arg("upload")
                .args(uploads),
        )?;
        Ok(())
    }

    /// Files in the dist directory, relative to the project root and sorted
    fn dist_files(&self) -> Result<Vec<String>> {
        let dist_dir = &self.config.index.dist_dir;
        let entries = match fs::read_dir(self.root.join(dist_dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(dist_dir.join(entry.file_name()).to_string_lossy().to_string());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn publish_aur(&self, version: &Version, report: &mut ReleaseReport) -> Result<()> {
        let aur = &self.config.aur;
        let workdir = aur.workdir();
        if let Err(e) = prepare_workdir(&workdir) {
            let reason = format!("{}: {e}", workdir.display());
            self.settle(report, AUR_WORKDIR, StepOutcome::not_started(reason))?;
            tracing::warn!("Skipping the rest of the AUR update");
            return Ok(());
        }

        let url = self.config.vcs.tarball_url(version);
        let tarball = workdir.join(version.tag());
        let checksums = match self.fetch_checksums(&url, &tarball).await {
            Ok(checksums) => {
                report.record(AUR_DOWNLOAD, StepOutcome::ok());
                checksums
            }
            Err(e) => {
                self.settle(report, AUR_DOWNLOAD, StepOutcome::not_started(e.to_string()))?;
                tracing::warn!("No checksums for {}, skipping the rest of the AUR update", url);
                return Ok(());
            }
        };

        let package_dir = workdir.join(&aur.package);
        let cloned = Git::new(self.backends.runner.as_ref(), &workdir).clone_repo(&aur.repository);
        report.record(AUR_CLONE, cloned.clone());

        if !package_dir.is_dir() {
            tracing::warn!("Could not clone AUR package: {}", cloned.describe());
            self.backends.prompter.pause(&format!(
                "Could not clone AUR package. Please clone manually in {} and press enter afterwards",
                workdir.display()
            ))?;
            if !package_dir.is_dir() {
                return Err(ShipError::PackageRepoMissing { path: package_dir });
            }
        }

        let pkgbuild_path = package_dir.join(PKGBUILD);
        if let Err(e) =
            pkgbuild::rewrite_file(&pkgbuild_path, &PackageUpdate::new(version, &checksums))
        {
            let reason = format!("{}: {e}", pkgbuild_path.display());
            self.settle(report, AUR_PKGBUILD, StepOutcome::not_started(reason))?;
            tracing::warn!("Skipping the rest of the AUR update");
            return Ok(());
        }
        report.record(AUR_PKGBUILD, StepOutcome::ok());

        let mut srcinfo = self.backends.runner.run(
            &Invocation::new("makepkg", &package_dir)
                .arg("--printsrcinfo")
                .captured(),
        );
        if srcinfo.success() {
            let srcinfo_path = package_dir.join(".SRCINFO");
            if let Err(e) = fs::write(&srcinfo_path, &srcinfo.stdout) {
                srcinfo = StepOutcome::not_started(format!("{}: {e}", srcinfo_path.display()));
            }
        }
        self.settle(report, AUR_SRCINFO, srcinfo)?;

        let git = Git::new(self.backends.runner.as_ref(), &package_dir);
        self.settle(report, AUR_COMMIT, git.commit_all(&format!("version {version}")))?;
        self.settle(report, AUR_PUSH, git.push())?;
        Ok(())
    }

    async fn fetch_checksums(&self, url: &str, tarball: &Path) -> Result<Checksums> {
        self.backends.downloader.download(url, tarball).await?;
        checksum::compute(tarball)
    }

    fn publish_container(&self, version: &Version, report: &mut ReleaseReport) -> Result<()> {
        let context = self.root.join(&self.config.container.context);
        let image = &self.config.container.image;
        let latest = format!("{image}:latest");
        let versioned = format!("{image}:{version}");

        self.step(report, DOCKER_LOGIN, Invocation::new("docker", &context).arg("login"))?;
        self.step(
            report,
            DOCKER_BUILD,
            Invocation::new("docker", &context).args([
                "build",
                "--no-cache",
                "--tag",
                latest.as_str(),
                "--tag",
                versioned.as_str(),
                ".",
            ]),
        )?;
        self.step(
            report,
            DOCKER_PUSH_LATEST,
            Invocation::new("docker", &context).args(["push", latest.as_str()]),
        )?;
        self.step(
            report,
            DOCKER_PUSH_VERSION,
            Invocation::new("docker", &context).args(["push", versioned.as_str()]),
        )?;
        Ok(())
    }
}

/// Start the AUR step from an empty work directory
fn prepare_workdir(workdir: &Path) -> Result<()> {
    match fs::remove_dir_all(workdir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(workdir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prepare_workdir_empties_existing_dir() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("aur");
        fs::create_dir_all(workdir.join("urh")).unwrap();
        fs::write(workdir.join("v1.0.0"), b"old tarball").unwrap();

        prepare_workdir(&workdir).unwrap();

        assert!(workdir.is_dir());
        assert_eq!(fs::read_dir(&workdir).unwrap().count(), 0);
    }

    #[test]
    fn test_prepare_workdir_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("nested/aur");
        prepare_workdir(&workdir).unwrap();
        assert!(workdir.is_dir());
    }
}
