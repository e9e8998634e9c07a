//! # shipwright
//!
//! Release automation for a Python project that ships to several channels.
//!
//! ## Overview
//!
//! `shipwright` bumps the project version, commits and tags it, uploads a
//! source distribution to PyPI, mirrors the release into the project's AUR
//! package and builds and pushes a Docker image. The pipeline is sequential
//! and best effort: a failed upload does not undo the tag that preceded it.
//!
//! ## Pipeline
//!
//! 1. `twine` must be on `PATH` and the current branch must be `master`
//! 2. A lock file marks the release as in progress
//! 3. `VERSION = "x.y.z"` becomes `VERSION = "x.y.(z+1)"`
//! 4. The version is committed, pushed and tagged `v<version>`
//! 5. `python setup.py sdist` and `twine upload dist/*`
//! 6. The tagged tarball is downloaded and hashed, and the AUR `PKGBUILD` and
//!    `.SRCINFO` are updated, committed and pushed
//! 7. The lock file is removed
//! 8. `docker build --no-cache` tags `latest` and the version, then both are
//!    pushed
//!
//! ## Usage
//!
//! ```bash
//! # Clean, confirm, release, clean
//! shipwright
//!
//! # Stop at the first failed step instead of carrying on
//! shipwright --on-failure halt
//!
//! # Release without the Docker image
//! shipwright --skip-container
//!
//! # Just remove build leftovers
//! shipwright clean
//! ```
//!
//! ## Configuration
//!
//! Configuration is read from `.config/shipwright.toml` in the project root,
//! or `~/.config/shipwright.toml` for user-wide settings.

/// Sequencing of the release steps
pub mod release;

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration file handling and default settings management
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// MD5 and SHA-256 digests of release tarballs
pub mod checksum;

/// Removal of generated build and cache directories
pub mod clean;

/// Release tarball downloads
pub mod download;

/// Release-in-progress lock file
pub mod lock;

/// PKGBUILD field rewriting
pub mod pkgbuild;

/// Operator prompts
pub mod prompt;

/// Per-step outcome summary of a release
pub mod report;

/// External process execution
pub mod runner;

/// Git operations
pub mod vcs;

/// Version parsing, bumping and the version record file
pub mod version;
