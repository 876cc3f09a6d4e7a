//! Job Records

use std::{collections::BTreeMap, fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::tenants::records::TenantUuid, uuids::TypedUuid};

/// Job UUID
pub type JobUuid = TypedUuid<JobRecord>;

#[derive(Debug, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant::new($kind, other)),
                }
            }
        }
    };
}

/// Kind of assessment requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestProfile {
    #[default]
    Complete,
    Security,
    Performance,
    Functional,
}

string_enum!(TestProfile, "profile", {
    Complete => "complete",
    Security => "security",
    Performance => "performance",
    Functional => "functional",
});

/// How thoroughly the engine should probe the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanDepth {
    Basic,
    #[default]
    Standard,
    Deep,
}

string_enum!(ScanDepth, "depth", {
    Basic => "basic",
    Standard => "standard",
    Deep => "deep",
});

impl ScanDepth {
    /// Reported coverage percentage for a completed job at this depth.
    #[must_use]
    pub const fn coverage(self) -> u8 {
        match self {
            Self::Basic => 70,
            Self::Standard => 85,
            Self::Deep => 95,
        }
    }
}

/// Job lifecycle state. Transitions only move forward:
/// `pending -> running -> completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

string_enum!(JobStatus, "status", {
    Pending => "pending",
    Running => "running",
    Completed => "completed",
    Failed => "failed",
});

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

string_enum!(Severity, "severity", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// A single reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Weakness category, e.g. `SQL Injection`.
    #[serde(rename = "type")]
    pub kind: String,

    pub severity: Severity,

    /// Example input demonstrating the issue.
    pub payload: String,

    pub description: String,

    pub recommendation: String,

    /// The specific URL the finding applies to.
    pub url: String,
}

/// Finding counts per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }
}

/// Letter grade derived from the findings; worse severities yield lower grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Score {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

string_enum!(Score, "score", {
    APlus => "A+",
    A => "A",
    BPlus => "B+",
    B => "B",
    C => "C",
    D => "D",
    F => "F",
});

/// Result attached to a job by its terminal write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub vulnerabilities: u32,

    /// Percentage of the target surface exercised.
    pub coverage: u8,

    pub score: Score,

    pub summary: SeverityCounts,

    /// Findings in the order the engine reported them.
    pub findings: Vec<Finding>,
}

impl JobResult {
    /// Result stored on a failed job: nothing found, nothing covered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vulnerabilities: 0,
            coverage: 0,
            score: Score::F,
            summary: SeverityCounts::default(),
            findings: Vec::new(),
        }
    }
}

/// Job Record
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub uuid: JobUuid,

    /// Owning tenant; every read is scoped by it.
    pub owner: TenantUuid,

    pub target: String,

    pub profile: TestProfile,

    pub depth: ScanDepth,

    /// Extra request headers forwarded to the engine.
    pub headers: BTreeMap<String, String>,

    pub status: JobStatus,

    /// Stored progress: 0 until the terminal write, then 100.
    pub progress: u8,

    pub created_at: Timestamp,

    pub started_at: Option<Timestamp>,

    pub completed_at: Option<Timestamp>,

    /// Whole seconds between start and completion.
    pub duration_seconds: Option<i64>,

    /// Why a failed job failed.
    pub failure: Option<String>,

    /// Set by the terminal write; failed jobs get [`JobResult::empty`].
    pub result: Option<JobResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn finding_uses_type_on_the_wire() -> Result<(), serde_json::Error> {
        let finding = Finding {
            kind: "SQL Injection".to_string(),
            severity: Severity::High,
            payload: "' OR '1'='1".to_string(),
            description: "injectable parameter".to_string(),
            recommendation: "use prepared statements".to_string(),
            url: "https://example.com".to_string(),
        };

        let value = serde_json::to_value(&finding)?;

        assert_eq!(value["type"], "SQL Injection");
        assert_eq!(value["severity"], "high");

        Ok(())
    }

    #[test]
    fn score_serializes_as_letter() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Score::APlus)?, "\"A+\"");
        assert_eq!(serde_json::from_str::<Score>("\"B+\"")?, Score::BPlus);
        assert_eq!(Score::C.to_string(), "C");

        Ok(())
    }

    #[test]
    fn profile_and_depth_parse_lowercase() {
        assert_eq!("security".parse::<TestProfile>().ok(), Some(TestProfile::Security));
        assert_eq!("deep".parse::<ScanDepth>().ok(), Some(ScanDepth::Deep));
        assert!("Security".parse::<TestProfile>().is_err());
    }
}
