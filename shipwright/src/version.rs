use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, ShipError};

/// A dotted sequence of non-negative integers, e.g. `2.9.3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Increment the rightmost component by one. Nothing carries into the
    /// components to its left.
    pub fn bump(&self) -> Result<Version> {
        let mut components = self.components.clone();
        let last = components.last_mut().ok_or_else(|| ShipError::VersionParse {
            input: String::new(),
            reason: "version has no components".to_string(),
        })?;
        *last = last.checked_add(1).ok_or_else(|| ShipError::VersionParse {
            input: self.to_string(),
            reason: "last component overflows".to_string(),
        })?;
        Ok(Version { components })
    }

    /// Tag name used for this version on the VCS host
    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl FromStr for Version {
    type Err = ShipError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ShipError::VersionParse {
                input: s.to_string(),
                reason: "empty version string".to_string(),
            });
        }

        let components = input
            .split('.')
            .map(|part| {
                let not_integer = |detail: String| ShipError::VersionParse {
                    input: input.to_string(),
                    reason: format!("component '{part}' is not a non-negative integer{detail}"),
                };
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(not_integer(String::new()));
                }
                part.parse::<u64>().map_err(|e| not_integer(format!(" ({e})")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Version { components })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// The file holding the project's version as a single `KEY = "x.y.z"`
/// assignment
#[derive(Debug, Clone)]
pub struct VersionRecord {
    path: PathBuf,
    key: String,
}

impl VersionRecord {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current version from the record
    pub fn read(&self) -> Result<Version> {
        let content = fs::read_to_string(&self.path).map_err(|e| ShipError::VersionRecord {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != self.key {
                continue;
            }

            let value = value.trim();
            let unquoted = ['"', '\'']
                .into_iter()
                .find_map(|quote| {
                    let rest = value.strip_prefix(quote)?;
                    rest.find(quote).map(|end| &rest[..end])
                })
                .ok_or_else(|| ShipError::VersionRecord {
                    path: self.path.clone(),
                    message: format!("{} is not a quoted string: {value}", self.key),
                })?;

            return unquoted.parse();
        }

        Err(ShipError::VersionRecord {
            path: self.path.clone(),
            message: format!("no {} assignment found", self.key),
        })
    }

    /// Overwrite the whole record with a single assignment of `version`
    pub fn write(&self, version: &Version) -> Result<()> {
        fs::write(&self.path, format!("{} = \"{}\"\n", self.key, version))?;
        tracing::debug!("Wrote {} to {}", version, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bump_increments_last_component() {
        let version: Version = "4.1.2".parse().unwrap();
        assert_eq!(version.bump().unwrap().to_string(), "4.1.3");
    }

    #[test]
    fn test_bump_does_not_carry() {
        let version: Version = "1.2.9".parse().unwrap();
        assert_eq!(version.bump().unwrap().to_string(), "1.2.10");
    }

    #[test]
    fn test_bump_single_and_long_versions() {
        assert_eq!("7".parse::<Version>().unwrap().bump().unwrap().to_string(), "8");
        assert_eq!(
            "2.9.3.99".parse::<Version>().unwrap().bump().unwrap().to_string(),
            "2.9.3.100"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("1..2".parse::<Version>().is_err());
        assert!("1.2.beta".parse::<Version>().is_err());
        assert!("-1.2".parse::<Version>().is_err());
        assert!("1.2.+3".parse::<Version>().is_err());
        assert!("1. 2".parse::<Version>().is_err());
    }

    #[test]
    fn test_tag_name() {
        let version: Version = "2.9.3".parse().unwrap();
        assert_eq!(version.tag(), "v2.9.3");
    }

    #[test]
    fn test_record_read_and_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.py");
        fs::write(&path, "VERSION = \"4.1.2\" \n").unwrap();

        let record = VersionRecord::new(&path, "VERSION");
        let version = record.read().unwrap();
        assert_eq!(version.to_string(), "4.1.2");

        record.write(&version.bump().unwrap()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "VERSION = \"4.1.3\"\n");
    }

    #[test]
    fn test_record_skips_other_assignments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.py");
        fs::write(&path, "# generated\nNAME = \"urh\"\nVERSION = '0.9'\n").unwrap();

        let version = VersionRecord::new(&path, "VERSION").read().unwrap();
        assert_eq!(version.components(), &[0, 9]);
    }

    #[test]
    fn test_record_allows_trailing_comment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.py");
        fs::write(&path, "VERSION = \"4.1.2\"  # bumped by CI\n").unwrap();

        let version = VersionRecord::new(&path, "VERSION").read().unwrap();
        assert_eq!(version.to_string(), "4.1.2");
    }

    #[test]
    fn test_record_unterminated_quote() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.py");
        fs::write(&path, "VERSION = \"4.1.2\n").unwrap();

        let err = VersionRecord::new(&path, "VERSION").read().unwrap_err();
        assert!(matches!(err, ShipError::VersionRecord { .. }));
    }

    #[test]
    fn test_record_missing_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.py");
        fs::write(&path, "NAME = \"urh\"\n").unwrap();

        let err = VersionRecord::new(&path, "VERSION").read().unwrap_err();
        assert!(matches!(err, ShipError::VersionRecord { .. }));
    }
}
