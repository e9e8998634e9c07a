use std::fmt;

use crate::runner::StepOutcome;
use crate::version::Version;

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: String,
    pub outcome: StepOutcome,
}

/// Every external step a release ran, in order, with its outcome
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version: Version,
    pub steps: Vec<StepRecord>,
}

impl ReleaseReport {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, name: &str, outcome: StepOutcome) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            outcome,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| !s.outcome.success())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for ReleaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Release {}", self.version)?;
        for step in &self.steps {
            let mark = if step.outcome.success() { "ok" } else { "FAILED" };
            write!(f, "  [{mark:>6}] {}", step.name)?;
            if !step.outcome.success() {
                write!(f, " ({})", step.outcome.describe())?;
            }
            writeln!(f)?;
        }

        let failed = self.failures().count();
        if failed > 0 {
            write!(f, "{failed} step(s) failed; check the release state manually")
        } else {
            write!(f, "All steps succeeded")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = ReleaseReport::new("1.0.1".parse().unwrap());
        report.record("git push", StepOutcome::ok());
        report.record("docker push", StepOutcome::exited(1, "denied"));

        assert!(!report.is_clean());
        assert_eq!(report.failures().count(), 1);
        assert!(report.step("git push").unwrap().outcome.success());

        let text = report.to_string();
        assert!(text.starts_with("Release 1.0.1"));
        assert!(text.contains("[FAILED] docker push (exit status 1: denied)"));
        assert!(text.ends_with("1 step(s) failed; check the release state manually"));
    }
}
