//! Shared fixtures for heifreg-core integration tests.
//!
//! `FakeRunner` hands out canned `CapturedResult`s keyed by argument list, so
//! suites can be exercised without any subject binary on disk.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use heifreg_core::{
    CapturedResult, Environment, HarnessError, Result, SubjectRunner, Subjects, TestEnvironment,
    VersionInfo,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

pub const VERSION: &str = "1.17.6";

pub fn ok(stdout: impl AsRef<[u8]>) -> CapturedResult {
    CapturedResult {
        stdout: stdout.as_ref().to_vec(),
        stderr: Vec::new(),
        exit_code: Some(0),
    }
}

pub fn with_stderr(stdout: &str, stderr: &str) -> CapturedResult {
    CapturedResult {
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        exit_code: Some(0),
    }
}

pub fn with_exit(stdout: &str, exit_code: Option<i32>) -> CapturedResult {
    CapturedResult {
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
        exit_code,
    }
}

#[derive(Default)]
pub struct FakeRunner {
    responses: HashMap<(Utf8PathBuf, Vec<String>), CapturedResult>,
    calls: Mutex<Vec<(Utf8PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, program: &Utf8Path, args: &[&str], result: CapturedResult) -> Self {
        let key = (
            program.to_owned(),
            args.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        );
        self.responses.insert(key, result);
        self
    }

    pub fn calls(&self) -> Vec<(Utf8PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SubjectRunner for FakeRunner {
    fn run(&self, program: &Utf8Path, args: &[&str]) -> Result<CapturedResult> {
        let key = (
            program.to_owned(),
            args.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        );
        self.calls.lock().unwrap().push(key.clone());
        self.responses
            .get(&key)
            .cloned()
            .ok_or_else(|| HarnessError::Spawn {
                program: program.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no canned response"),
            })
    }
}

/// Temporary corpus and artifact trees plus an `Environment` pointing at them.
pub struct Fixture {
    _temp_dir: TempDir,
    pub root: Utf8PathBuf,
    pub env: Environment,
    pub subjects: Subjects,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let corpus_root = root.join("heif_conformance");
        let static_root = root.join("static");
        std::fs::create_dir_all(corpus_root.join("conformance_files")).unwrap();
        std::fs::create_dir_all(static_root.join("conformance_files_expected_info")).unwrap();
        std::fs::create_dir_all(static_root.join("conformance_files_expected_dump")).unwrap();

        let env = Environment::new(
            VersionInfo {
                version: VERSION.to_string(),
            },
            TestEnvironment {
                corpus_root,
                static_root,
            },
        );
        let subjects = Subjects {
            heif_info: root.join("bin/heif-info"),
            heif_convert: root.join("bin/heif-convert"),
        };

        Self {
            _temp_dir: temp_dir,
            root,
            env,
            subjects,
        }
    }

    pub fn expect_info(&self, filename: &str, text: impl AsRef<[u8]>) {
        std::fs::write(self.env.expected_info_path(filename), text).unwrap();
    }

    pub fn expect_dump(&self, filename: &str, text: impl AsRef<[u8]>) {
        std::fs::write(self.env.expected_dump_path(filename), text).unwrap();
    }

    pub fn input(&self, filename: &str) -> String {
        self.env.conformance_file_path(filename).into_string()
    }

    pub fn info(&self) -> &Utf8Path {
        &self.subjects.heif_info
    }

    pub fn convert(&self) -> &Utf8Path {
        &self.subjects.heif_convert
    }
}
