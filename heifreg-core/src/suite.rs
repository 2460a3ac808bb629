//! Drives the matrix: one subject invocation and one comparison per case.

use crate::config::{Environment, RunConfig};
use crate::error::{HarnessError, Result};
use crate::golden;
use crate::help;
use crate::matrix::{Expectation, Mode, Subject, TestCase, TestMatrix};
use crate::report::{CaseResult, Report, Verdict};
use crate::runner::{CapturedResult, SubjectRunner};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

pub const DUMP_FLAG: &str = "--dump-boxes";
pub const HELP_FLAG: &str = "--help";

/// Locations of the subject executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    pub heif_info: Utf8PathBuf,
    pub heif_convert: Utf8PathBuf,
}

impl Subjects {
    pub fn path(&self, subject: Subject) -> &Utf8Path {
        match subject {
            Subject::HeifInfo => &self.heif_info,
            Subject::HeifConvert => &self.heif_convert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteOptions {
    pub jobs: usize,
    pub strict_exit_code: bool,
    pub strict_xfail: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for SuiteOptions {
    fn from(run: &RunConfig) -> Self {
        Self {
            jobs: run.jobs.max(1),
            strict_exit_code: run.strict_exit_code,
            strict_xfail: run.strict_xfail,
        }
    }
}

pub struct Suite<'a, R> {
    env: &'a Environment,
    subjects: &'a Subjects,
    runner: R,
    options: SuiteOptions,
}

impl<'a, R: SubjectRunner + Sync> Suite<'a, R> {
    pub fn new(
        env: &'a Environment,
        subjects: &'a Subjects,
        runner: R,
        options: SuiteOptions,
    ) -> Self {
        Self {
            env,
            subjects,
            runner,
            options,
        }
    }

    /// Run every case of `matrix`. Results come back in declaration order
    /// whatever the number of jobs.
    pub fn run(&self, matrix: &TestMatrix) -> Result<Report> {
        let cases = matrix.cases();
        info!(
            "Running {} cases for {} conformance files ({} jobs)",
            cases.len(),
            matrix.len(),
            self.options.jobs
        );

        let results: Vec<CaseResult> = if self.options.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
                .map_err(|e| HarnessError::WorkerPool {
                    jobs: self.options.jobs,
                    reason: e.to_string(),
                })?;
            pool.install(|| {
                cases
                    .par_iter()
                    .map(|case| self.run_case(case))
                    .collect::<Vec<_>>()
            })
        } else {
            cases.iter().map(|case| self.run_case(case)).collect()
        };

        let report = Report::new(self.env.heif_version(), results, self.options.strict_xfail);
        info!("{}", report.summary);
        Ok(report)
    }

    pub fn run_case(&self, case: &TestCase) -> CaseResult {
        let id = case.id();
        let (check, exit_code) = match self.invoke(case) {
            Ok(captured) => (self.check(case, &captured), captured.exit_code),
            Err(e) => (Err(e.to_string()), None),
        };

        let verdict = match (&case.expectation, check) {
            (Expectation::Pass, Ok(())) => {
                debug!("PASS {}", id);
                Verdict::Pass
            }
            (Expectation::Pass, Err(detail)) => {
                error!("FAIL {}: {}", id, detail);
                Verdict::Fail { detail }
            }
            (Expectation::ExpectedFail { reason }, Err(detail)) => {
                info!("XFAIL {} ({})", id, reason);
                Verdict::ExpectedFail {
                    reason: reason.clone(),
                    detail,
                }
            }
            (Expectation::ExpectedFail { reason }, Ok(())) => {
                warn!("XPASS {}: declared expected-fail ({}) but passed", id, reason);
                Verdict::UnexpectedPass {
                    reason: reason.clone(),
                }
            }
        };

        CaseResult {
            id,
            subject: case.subject,
            mode: case.mode,
            filename: case.filename.clone(),
            verdict,
            exit_code,
        }
    }

    fn invoke(&self, case: &TestCase) -> Result<CapturedResult> {
        let program = self.subjects.path(case.subject);
        match (case.mode, &case.filename) {
            (Mode::Help, _) => self.runner.run(program, &[HELP_FLAG]),
            (Mode::Info, Some(filename)) => {
                let input = self.env.conformance_file_path(filename);
                self.runner.run(program, &[input.as_str()])
            }
            (Mode::Dump, Some(filename)) => {
                let input = self.env.conformance_file_path(filename);
                self.runner.run(program, &[DUMP_FLAG, input.as_str()])
            }
            (mode, None) => Err(HarnessError::Matrix(format!(
                "{mode} case for {} has no conformance file",
                case.subject
            ))),
        }
    }

    /// Compare one invocation against its oracle. `Err` carries a
    /// human-readable description of the first problem found.
    fn check(
        &self,
        case: &TestCase,
        captured: &CapturedResult,
    ) -> std::result::Result<(), String> {
        let filename = match (case.mode, &case.filename) {
            (Mode::Help, _) => {
                let expected = help::render(
                    case.subject.help_template(),
                    case.subject.name(),
                    self.env.heif_version(),
                );
                return match golden::diff_bytes(expected.as_bytes(), &captured.stderr) {
                    None => Ok(()),
                    Some(diff) => Err(format!("help text on stderr differs: {diff}")),
                };
            }
            (_, Some(filename)) => filename,
            (mode, None) => return Err(format!("{mode} case has no conformance file")),
        };

        let artifact = match case.mode {
            Mode::Dump => self.env.expected_dump_path(filename),
            _ => self.env.expected_info_path(filename),
        };
        match golden::compare(&captured.stdout, &artifact) {
            Ok(None) => {}
            Ok(Some(diff)) => return Err(format!("stdout differs from {artifact}: {diff}")),
            Err(e) => return Err(e.to_string()),
        }

        if !captured.stderr.is_empty() {
            return Err(format!(
                "expected empty stderr, got \"{}\"",
                captured.stderr.escape_ascii()
            ));
        }

        // Output matched; the exit status alone does not fail the case
        // unless strict_exit_code is set.
        if !captured.success() {
            let status = match captured.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "termination by signal".to_owned(),
            };
            if self.options.strict_exit_code {
                return Err(format!("output matched but subject ended with {status}"));
            }
            warn!("{} matched its golden output but ended with {}", case.id(), status);
        }
        Ok(())
    }
}
