use crate::error::{HarnessError, Result};
use crate::matrix::{Mode, Subject};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;

/// How a single case ended up, after applying its declared expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail { detail: String },
    /// Failed, but the matrix says it should
    ExpectedFail { reason: String, detail: String },
    /// Passed although declared expected-fail; flagged for review
    UnexpectedPass { reason: String },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail { .. } => "FAIL",
            Verdict::ExpectedFail { .. } => "XFAIL",
            Verdict::UnexpectedPass { .. } => "XPASS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    pub id: String,
    pub subject: Subject,
    pub mode: Mode,
    pub filename: Option<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
    /// `None` if the subject never ran or was killed by a signal
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
    pub unexpected_passes: usize,
}

impl Summary {
    fn tally(results: &[CaseResult]) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in results {
            match result.verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Fail { .. } => summary.failed += 1,
                Verdict::ExpectedFail { .. } => summary.expected_failures += 1,
                Verdict::UnexpectedPass { .. } => summary.unexpected_passes += 1,
            }
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cases: {} passed, {} failed, {} expected failures, {} unexpected passes",
            self.total, self.passed, self.failed, self.expected_failures, self.unexpected_passes
        )
    }
}

/// Results of one full matrix run, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub version: String,
    pub strict_xfail: bool,
    pub summary: Summary,
    pub results: Vec<CaseResult>,
}

impl Report {
    pub fn new(version: impl Into<String>, results: Vec<CaseResult>, strict_xfail: bool) -> Self {
        Self {
            version: version.into(),
            strict_xfail,
            summary: Summary::tally(&results),
            results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0 && !(self.strict_xfail && self.summary.unexpected_passes > 0)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.verdict, Verdict::Fail { .. }))
    }

    /// Verdicts only, keyed by case id; handy for comparing two runs.
    pub fn outcomes(&self) -> Vec<(&str, &'static str)> {
        self.results
            .iter()
            .map(|r| (r.id.as_str(), r.verdict.label()))
            .collect()
    }

    pub fn write_json(&self, path: &Utf8Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HarnessError::Report(format!("Failed to serialize report: {e}")))?;
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)
            .map_err(|e| HarnessError::Report(format!("Failed to write {path}: {e}")))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            write!(f, "{:<6}{}", result.verdict.label(), result.id)?;
            match &result.verdict {
                Verdict::Pass => {}
                Verdict::Fail { detail } => {
                    write!(f, "\n{}", indent(detail))?;
                }
                Verdict::ExpectedFail { reason, .. } | Verdict::UnexpectedPass { reason } => {
                    write!(f, " ({reason})")?;
                }
            }
            if let Some(code) = result.exit_code.filter(|c| *c != 0) {
                write!(f, " [exit code {code}]")?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.summary)
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("      {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
