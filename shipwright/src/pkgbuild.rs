//! Structured rewrite of an Arch Linux `PKGBUILD`.
//!
//! Only three assignments are touched: `pkgver=`, `md5sums=` and
//! `sha256sums=`, recognised at the start of a line. Every other line,
//! including its line terminator, is written back exactly as read.

use std::fs;
use std::path::Path;

use crate::checksum::Checksums;
use crate::error::Result;
use crate::version::Version;

/// Name of the package definition file inside the package repository
pub const PKGBUILD: &str = "PKGBUILD";

/// The assignments a release rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Pkgver,
    Md5sums,
    Sha256sums,
}

impl Field {
    const ALL: [Field; 3] = [Field::Pkgver, Field::Md5sums, Field::Sha256sums];

    pub fn key(self) -> &'static str {
        match self {
            Field::Pkgver => "pkgver",
            Field::Md5sums => "md5sums",
            Field::Sha256sums => "sha256sums",
        }
    }

    fn recognise(line: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| {
            line.strip_prefix(field.key())
                .is_some_and(|rest| rest.starts_with('='))
        })
    }
}

/// New values for the recognised fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate {
    pub pkgver: String,
    pub md5: String,
    pub sha256: String,
}

impl PackageUpdate {
    pub fn new(version: &Version, checksums: &Checksums) -> Self {
        Self {
            pkgver: version.to_string(),
            md5: checksums.md5.clone(),
            sha256: checksums.sha256.clone(),
        }
    }

    fn render(&self, field: Field) -> String {
        match field {
            Field::Pkgver => format!("pkgver={}", self.pkgver),
            Field::Md5sums => format!("md5sums=('{}')", self.md5),
            Field::Sha256sums => format!("sha256sums=('{}')", self.sha256),
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    ending: String,
    field: Option<Field>,
}

#[derive(Debug, Clone)]
pub struct PackageDefinition {
    lines: Vec<Line>,
}

impl PackageDefinition {
    pub fn parse(content: &str) -> Self {
        let lines = content
            .split_inclusive('\n')
            .map(|raw| {
                let (text, ending) = if let Some(text) = raw.strip_suffix("\r\n") {
                    (text, "\r\n")
                } else if let Some(text) = raw.strip_suffix('\n') {
                    (text, "\n")
                } else {
                    (raw, "")
                };
                Line {
                    text: text.to_string(),
                    ending: ending.to_string(),
                    field: Field::recognise(text),
                }
            })
            .collect();

        Self { lines }
    }

    /// Raw value of the first assignment of `field`, if present
    pub fn value(&self, field: Field) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.field == Some(field))
            .and_then(|line| line.text.split_once('='))
            .map(|(_, value)| value)
    }

    /// Rewrite every recognised assignment. Returns how many lines matched.
    pub fn apply(&mut self, update: &PackageUpdate) -> usize {
        let mut rewritten = 0;
        for line in &mut self.lines {
            if let Some(field) = line.field {
                line.text = update.render(field);
                rewritten += 1;
            }
        }
        rewritten
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(&line.ending);
        }
        out
    }
}

/// Rewrite a `PKGBUILD` on disk in place
pub fn rewrite_file(path: &Path, update: &PackageUpdate) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    let mut definition = PackageDefinition::parse(&content);
    let rewritten = definition.apply(update);
    fs::write(path, definition.render())?;

    if rewritten == 0 {
        tracing::warn!(
            "{} has no pkgver/md5sums/sha256sums lines; nothing was updated",
            path.display()
        );
    } else {
        tracing::info!("Updated {} fields in {}", rewritten, path.display());
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> PackageUpdate {
        PackageUpdate {
            pkgver: "2.9.4".to_string(),
            md5: "aaaa".to_string(),
            sha256: "bbbb".to_string(),
        }
    }

    #[test]
    fn test_recognises_only_assignments() {
        assert_eq!(Field::recognise("pkgver=1.0"), Some(Field::Pkgver));
        assert_eq!(Field::recognise("md5sums=('x')"), Some(Field::Md5sums));
        assert_eq!(Field::recognise("sha256sums=('x')"), Some(Field::Sha256sums));
        assert_eq!(Field::recognise("pkgver() {"), None);
        assert_eq!(Field::recognise("  pkgver=1.0"), None);
        assert_eq!(Field::recognise("pkgrel=1"), None);
    }

    #[test]
    fn test_apply_rewrites_fields() {
        let mut def = PackageDefinition::parse(
            "pkgname=urh\npkgver=2.9.3\npkgrel=1\nmd5sums=('old')\nsha256sums=('old')\n",
        );
        assert_eq!(def.apply(&update()), 3);
        assert_eq!(
            def.render(),
            "pkgname=urh\npkgver=2.9.4\npkgrel=1\nmd5sums=('aaaa')\nsha256sums=('bbbb')\n"
        );
        assert_eq!(def.value(Field::Pkgver), Some("2.9.4"));
    }

    #[test]
    fn test_line_endings_are_preserved() {
        let mut def = PackageDefinition::parse("# crlf\r\npkgver=1\r\nlast-line-no-newline");
        def.apply(&update());
        assert_eq!(def.render(), "# crlf\r\npkgver=2.9.4\r\nlast-line-no-newline");
    }
}
