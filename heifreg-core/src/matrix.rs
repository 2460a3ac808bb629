//! Declarative list of conformance files and their expected outcomes.

use crate::error::{HarnessError, Result};
use crate::help::{HEIF_CONVERT_HELP, HEIF_INFO_HELP};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

const NO_AVC: &str = "No AVC support yet";
const IMAGE_SEQUENCE: &str = "No supported brands - image sequence";
const NO_BRANDS: &str = "No supported brands";
const LHEVC: &str = "L-HEVC image";

/// The nokiatech HEIF conformance files exercised by `heif-info`, in run order.
const CONFORMANCE_FILES: &[(&str, Option<&str>)] = &[
    ("C001.heic", None),
    ("C002.heic", None),
    ("C003.heic", None),
    ("C004.heic", None),
    ("C005.heic", None),
    ("C006.heic", None),
    ("C007.heic", None),
    ("C008.heic", None),
    ("C009.heic", None),
    ("C010.heic", None),
    ("C011.heic", None),
    ("C012.heic", None),
    ("C013.heic", None),
    ("C014.heic", None),
    ("C015.heic", None),
    ("C016.heic", None),
    ("C017.heic", None),
    ("C018.heic", None),
    ("C019.heic", None),
    ("C020.heic", None),
    ("C021.heic", Some(NO_AVC)),
    ("C022.heic", None),
    ("C023.heic", None),
    ("C024.heic", None),
    ("C025.heic", None),
    ("C026.heic", Some(IMAGE_SEQUENCE)),
    ("C027.heic", Some(IMAGE_SEQUENCE)),
    ("C028.heic", Some(NO_BRANDS)),
    ("C029.heic", Some(NO_BRANDS)),
    ("C030.heic", Some(NO_BRANDS)),
    ("C031.heic", Some(NO_BRANDS)),
    ("C032.heic", Some(NO_BRANDS)),
    ("C034.heic", None),
    ("C036.heic", Some(NO_BRANDS)),
    ("C037.heic", Some(NO_BRANDS)),
    ("C038.heic", Some(NO_BRANDS)),
    ("C039.heic", None),
    ("C040.heic", None),
    ("C041.heic", Some(NO_BRANDS)),
    ("C042.heic", None),
    ("C043.heic", None),
    ("C044.heic", None),
    ("C045.heic", None),
    ("C046.heic", None),
    ("C047.heic", None),
    ("C048.heic", None),
    ("C049.heic", None),
    ("C050.heic", None),
    ("C051.heic", None),
    ("C052.heic", None),
    ("C053.heic", None),
    ("MIAF001.heic", None),
    ("MIAF002.heic", None),
    ("MIAF003.heic", None),
    ("MIAF004.heic", None),
    ("MIAF005.heic", None),
    ("MIAF006.heic", None),
    ("MIAF007.heic", None),
    ("multilayer001.heic", None),
    ("multilayer002.heic", Some(LHEVC)),
    ("multilayer003.heic", None),
    ("multilayer004.heic", Some(NO_AVC)),
    ("multilayer005.heic", None),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Expectation {
    Pass,
    ExpectedFail { reason: String },
}

impl Expectation {
    pub fn expected_fail(reason: impl Into<String>) -> Self {
        Expectation::ExpectedFail {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Expectation::Pass => None,
            Expectation::ExpectedFail { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub filename: String,
    pub expectation: Expectation,
}

impl MatrixEntry {
    pub fn pass(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            expectation: Expectation::Pass,
        }
    }

    pub fn expected_fail(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            expectation: Expectation::expected_fail(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Help,
    Info,
    Dump,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Help => "help",
            Mode::Info => "info",
            Mode::Dump => "dump",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The command-line tools under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subject {
    HeifInfo,
    HeifConvert,
}

impl Subject {
    /// Name the tool prints in its own help header.
    pub fn name(&self) -> &'static str {
        match self {
            Subject::HeifInfo => "heif-info",
            Subject::HeifConvert => "heif-convert",
        }
    }

    pub fn help_template(&self) -> &'static str {
        match self {
            Subject::HeifInfo => HEIF_INFO_HELP,
            Subject::HeifConvert => HEIF_CONVERT_HELP,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One independently reported (subject, mode, file) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub subject: Subject,
    pub mode: Mode,
    pub filename: Option<String>,
    pub expectation: Expectation,
}

impl TestCase {
    pub fn id(&self) -> String {
        match &self.filename {
            Some(filename) => format!("{}::{}[{}]", self.subject, self.mode, filename),
            None => format!("{}::{}", self.subject, self.mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMatrix {
    entries: Vec<MatrixEntry>,
}

impl TestMatrix {
    /// Build a matrix, rejecting empty or repeated filenames.
    pub fn new(entries: Vec<MatrixEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.filename.trim().is_empty() {
                return Err(HarnessError::Matrix("empty filename".to_owned()));
            }
            if !seen.insert(entry.filename.as_str()) {
                return Err(HarnessError::Matrix(format!(
                    "{} is listed more than once",
                    entry.filename
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The matrix run against the HEIF conformance corpus.
    pub fn conformance() -> Self {
        let entries = CONFORMANCE_FILES
            .iter()
            .map(|(filename, reason)| match reason {
                Some(reason) => MatrixEntry::expected_fail(*filename, *reason),
                None => MatrixEntry::pass(*filename),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every expected-fail entry with its reason, in declaration order.
    pub fn known_limitations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| {
            entry
                .expectation
                .reason()
                .map(|reason| (entry.filename.as_str(), reason))
        })
    }

    /// Expand into the ordered case list: one help case per subject, then
    /// info for every file, then dump for every file.
    pub fn cases(&self) -> Vec<TestCase> {
        let mut cases = Vec::with_capacity(2 + self.entries.len() * 2);

        for subject in [Subject::HeifInfo, Subject::HeifConvert] {
            cases.push(TestCase {
                subject,
                mode: Mode::Help,
                filename: None,
                expectation: Expectation::Pass,
            });
        }

        for mode in [Mode::Info, Mode::Dump] {
            cases.extend(self.entries.iter().map(|entry| TestCase {
                subject: Subject::HeifInfo,
                mode,
                filename: Some(entry.filename.clone()),
                expectation: entry.expectation.clone(),
            }));
        }

        cases
    }
}
