use crate::error::{HarnessError, Result};
use camino::Utf8Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Output of one subject invocation. Streams are kept as the raw bytes the
/// subject wrote; nothing is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CapturedResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a subject program to completion and captures what it wrote.
pub trait SubjectRunner {
    fn run(&self, program: &Utf8Path, args: &[&str]) -> Result<CapturedResult>;
}

impl<T: SubjectRunner + ?Sized> SubjectRunner for &T {
    fn run(&self, program: &Utf8Path, args: &[&str]) -> Result<CapturedResult> {
        (**self).run(program, args)
    }
}

/// Spawns the subject as a child process with piped output streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl SubjectRunner for ProcessRunner {
    fn run(&self, program: &Utf8Path, args: &[&str]) -> Result<CapturedResult> {
        debug!("Running {} {:?}", program, args);

        let output = Command::new(program.as_std_path())
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HarnessError::Spawn {
                program: program.to_owned(),
                source,
            })?;

        Ok(CapturedResult {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_streams_verbatim() {
        let result = ProcessRunner
            .run(
                Utf8Path::new("/bin/sh"),
                &["-c", "printf 'line one\\n\\n  indented  \\n'; printf 'warn\\n' >&2"],
            )
            .unwrap();

        assert_eq!(result.stdout, b"line one\n\n  indented  \n");
        assert_eq!(result.stderr, b"warn\n");
        assert_eq!(result.exit_code, Some(0));
        assert!(result.success());
    }

    #[test]
    fn test_non_zero_exit_is_reported_not_raised() {
        let result = ProcessRunner
            .run(Utf8Path::new("/bin/sh"), &["-c", "printf out; exit 3"])
            .unwrap();

        assert_eq!(result.stdout, b"out");
        assert!(result.stderr.is_empty());
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.success());
    }

    #[test]
    fn test_invalid_utf8_is_kept_raw() {
        let result = ProcessRunner
            .run(Utf8Path::new("/bin/sh"), &["-c", "printf 'name: \\376\\n'"])
            .unwrap();

        assert_eq!(result.stdout, b"name: \xfe\n");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = ProcessRunner
            .run(Utf8Path::new("/nonexistent/heif-info"), &["--help"])
            .unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }
}
