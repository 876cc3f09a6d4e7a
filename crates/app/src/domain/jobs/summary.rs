//! Result summaries for completed jobs.

use crate::domain::jobs::records::{Finding, JobResult, ScanDepth, Score, Severity, SeverityCounts};

/// Count findings by severity.
#[must_use]
pub fn count_severities(findings: &[Finding]) -> SeverityCounts {
    findings
        .iter()
        .fold(SeverityCounts::default(), |mut counts, finding| {
            match finding.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }

            counts
        })
}

/// Grade a set of counts. The worst severity present decides the band;
/// within a band more highs, then more mediums, grade lower.
#[must_use]
pub fn score(counts: &SeverityCounts) -> Score {
    match counts {
        SeverityCounts { critical: 1.., .. } => Score::F,
        SeverityCounts {
            high: 1, medium, ..
        } if *medium < 3 => Score::C,
        SeverityCounts { high: 1.., .. } => Score::D,
        SeverityCounts { medium: 3.., .. } => Score::B,
        SeverityCounts { medium: 1.., .. } => Score::BPlus,
        SeverityCounts { low: 1.., .. } => Score::A,
        SeverityCounts { .. } => Score::APlus,
    }
}

/// Build the result for a completed job.
#[must_use]
pub fn summarize(findings: Vec<Finding>, depth: ScanDepth) -> JobResult {
    let summary = count_severities(&findings);

    JobResult {
        vulnerabilities: summary.total(),
        coverage: depth.coverage(),
        score: score(&summary),
        summary,
        findings,
    }
}
