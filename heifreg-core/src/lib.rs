#![allow(clippy::cargo_common_metadata)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod golden;
pub mod help;
pub mod matrix;
pub mod report;
pub mod runner;
pub mod suite;

pub use config::{Environment, HarnessConfig, TestEnvironment, VersionInfo};
pub use corpus::{CorpusFetcher, CorpusProvisioner, GitFetcher, ProvisionOutcome};
pub use error::{HarnessError, Result};
pub use matrix::{Expectation, MatrixEntry, Mode, Subject, TestCase, TestMatrix};
pub use report::{CaseResult, Report, Summary, Verdict};
pub use runner::{CapturedResult, ProcessRunner, SubjectRunner};
pub use suite::{Suite, SuiteOptions, Subjects};
