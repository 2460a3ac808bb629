use crate::corpus::{CorpusFetcher, CorpusProvisioner};
use crate::error::{HarnessError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Version of the subject software, as written into its help text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionInfo {
    #[serde(rename = "version_str")]
    pub version: String,
}

/// Where the conformance corpus and the golden artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestEnvironment {
    #[serde(rename = "conformance_test_data")]
    pub corpus_root: Utf8PathBuf,
    #[serde(rename = "static_test_data")]
    pub static_root: Utf8PathBuf,
}

/// Immutable view over the two configuration documents.
///
/// Built once per session and handed by reference to everything that needs
/// corpus paths or the version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    version: VersionInfo,
    test_data: TestEnvironment,
}

impl Environment {
    pub const VERSION_DOCUMENT: &'static str = "version.json";
    pub const TEST_DATA_DOCUMENT: &'static str = "test_data.json";

    pub fn new(version: VersionInfo, test_data: TestEnvironment) -> Self {
        Self { version, test_data }
    }

    /// Load both documents from `data_dir`. Relative paths inside
    /// `test_data.json` are resolved against `data_dir`.
    pub fn load(data_dir: &Utf8Path) -> Result<Self> {
        let version: VersionInfo = read_json(&data_dir.join(Self::VERSION_DOCUMENT))?;
        if version.version.trim().is_empty() {
            return Err(HarnessError::config(
                data_dir.join(Self::VERSION_DOCUMENT),
                "version_str must not be empty",
            ));
        }

        let mut test_data: TestEnvironment =
            read_json(&data_dir.join(Self::TEST_DATA_DOCUMENT))?;
        test_data.corpus_root = resolve(data_dir, &test_data.corpus_root);
        test_data.static_root = resolve(data_dir, &test_data.static_root);

        info!("libheif version under test: {}", version.version);
        debug!("Corpus root: {}", test_data.corpus_root);
        debug!("Static artifacts root: {}", test_data.static_root);

        Ok(Self::new(version, test_data))
    }

    /// Load the documents and make sure the corpus exists locally.
    pub fn open<F: CorpusFetcher>(
        data_dir: &Utf8Path,
        provisioner: &CorpusProvisioner<F>,
    ) -> Result<Self> {
        let env = Self::load(data_dir)?;
        provisioner.ensure(env.corpus_root())?;
        Ok(env)
    }

    pub fn heif_version(&self) -> &str {
        &self.version.version
    }

    pub fn corpus_root(&self) -> &Utf8Path {
        &self.test_data.corpus_root
    }

    pub fn static_root(&self) -> &Utf8Path {
        &self.test_data.static_root
    }

    pub fn conformance_file_path(&self, filename: &str) -> Utf8PathBuf {
        self.test_data
            .corpus_root
            .join("conformance_files")
            .join(filename)
    }

    pub fn expected_info_path(&self, filename: &str) -> Utf8PathBuf {
        self.test_data
            .static_root
            .join("conformance_files_expected_info")
            .join(format!("{filename}.txt"))
    }

    pub fn expected_dump_path(&self, filename: &str) -> Utf8PathBuf {
        self.test_data
            .static_root
            .join("conformance_files_expected_dump")
            .join(format!("{filename}.dump"))
    }
}

/// Optional harness settings read from `heifreg.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub subjects: SubjectConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    #[serde(default = "default_remote")]
    pub remote: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubjectConfig {
    #[serde(default = "default_subject_dir")]
    pub directory: Utf8PathBuf,
    #[serde(default = "default_info_program")]
    pub info: String,
    #[serde(default = "default_convert_program")]
    pub convert: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Treat a non-zero exit status as a failure even when output matches
    #[serde(default)]
    pub strict_exit_code: bool,
    /// Fail the suite when an expected-fail case passes
    #[serde(default)]
    pub strict_xfail: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
        }
    }
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            directory: default_subject_dir(),
            info: default_info_program(),
            convert: default_convert_program(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            strict_exit_code: false,
            strict_xfail: false,
        }
    }
}

fn default_remote() -> String {
    "https://github.com/nokiatech/heif_conformance".to_owned()
}

fn default_subject_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("../examples")
}

fn default_info_program() -> String {
    "heif-info".to_owned()
}

fn default_convert_program() -> String {
    "heif-convert".to_owned()
}

const fn default_jobs() -> usize {
    1
}

impl HarnessConfig {
    pub const FILE_NAME: &'static str = "heifreg.toml";

    pub fn load_from_path<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::config(path, format!("Failed to read config: {e}")))?;

        let config: HarnessConfig = toml::from_str(&content)
            .map_err(|e| HarnessError::config(path, format!("Failed to parse config: {e}")))?;

        config.validate(path)?;
        Ok(config)
    }

    /// Read `heifreg.toml` from `data_dir` if present. A missing file yields
    /// the defaults; a malformed one is still an error.
    pub fn load_or_default(data_dir: &Utf8Path) -> Result<Self> {
        let path = data_dir.join(Self::FILE_NAME);
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            debug!("No {} in {}, using defaults", Self::FILE_NAME, data_dir);
            Ok(Self::default())
        }
    }

    pub fn subject_path(&self, data_dir: &Utf8Path, program: &str) -> Utf8PathBuf {
        resolve(data_dir, &self.subjects.directory).join(program)
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        if self.run.jobs == 0 {
            return Err(HarnessError::config(path, "run.jobs must be at least 1"));
        }
        if self.corpus.remote.trim().is_empty() {
            return Err(HarnessError::config(path, "corpus.remote must not be empty"));
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| HarnessError::config(path, format!("Failed to read document: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| HarnessError::config(path, format!("Failed to parse document: {e}")))
}

fn resolve(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    fn write_documents(dir: &Utf8Path, version: &str, test_data: &str) {
        std::fs::write(dir.join(Environment::VERSION_DOCUMENT), version).unwrap();
        std::fs::write(dir.join(Environment::TEST_DATA_DOCUMENT), test_data).unwrap();
    }

    fn fake_environment() -> Environment {
        Environment::new(
            VersionInfo {
                version: "1.17.6".to_string(),
            },
            TestEnvironment {
                corpus_root: "/data/heif_conformance".into(),
                static_root: "/data/static".into(),
            },
        )
    }

    #[test]
    fn test_path_conventions() {
        let env = fake_environment();
        assert_eq!(env.heif_version(), "1.17.6");
        assert_eq!(
            env.conformance_file_path("C001.heic"),
            "/data/heif_conformance/conformance_files/C001.heic"
        );
        assert_eq!(
            env.expected_info_path("C001.heic"),
            "/data/static/conformance_files_expected_info/C001.heic.txt"
        );
        assert_eq!(
            env.expected_dump_path("C005.heic"),
            "/data/static/conformance_files_expected_dump/C005.heic.dump"
        );
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        write_documents(
            &dir,
            r#"{"version_str": "1.18.0", "extra": true}"#,
            r#"{"conformance_test_data": "corpus", "static_test_data": "/abs/static"}"#,
        );

        let env = Environment::load(&dir).unwrap();
        assert_eq!(env.heif_version(), "1.18.0");
        assert_eq!(env.corpus_root(), dir.join("corpus"));
        assert_eq!(env.static_root(), Utf8Path::new("/abs/static"));
    }

    #[test]
    fn test_missing_document_is_config_error() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        std::fs::write(
            dir.join(Environment::VERSION_DOCUMENT),
            r#"{"version_str": "1.18.0"}"#,
        )
        .unwrap();

        match Environment::load(&dir) {
            Err(HarnessError::Config { path, .. }) => {
                assert_eq!(path, dir.join(Environment::TEST_DATA_DOCUMENT));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        write_documents(
            &dir,
            r#"{"version_str": "1.18.0"}"#,
            r#"{"conformance_test_data": "corpus"}"#,
        );

        let err = Environment::load(&dir).unwrap_err();
        assert!(err.to_string().contains("static_test_data"), "{err}");
    }

    #[test]
    fn test_empty_version_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        write_documents(
            &dir,
            r#"{"version_str": "  "}"#,
            r#"{"conformance_test_data": "a", "static_test_data": "b"}"#,
        );
        assert!(matches!(
            Environment::load(&dir),
            Err(HarnessError::Config { .. })
        ));
    }

    #[test]
    fn test_harness_config_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);

        let config = HarnessConfig::load_or_default(&dir).unwrap();
        assert_eq!(
            config.corpus.remote,
            "https://github.com/nokiatech/heif_conformance"
        );
        assert_eq!(config.run.jobs, 1);
        assert!(!config.run.strict_exit_code);
        assert_eq!(
            config.subject_path(&dir, &config.subjects.info),
            dir.join("../examples").join("heif-info")
        );
    }

    #[test]
    fn test_harness_config_partial_file() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        std::fs::write(
            dir.join(HarnessConfig::FILE_NAME),
            "[run]\njobs = 4\nstrict_xfail = true\n\n[subjects]\ndirectory = \"/opt/libheif/bin\"\n",
        )
        .unwrap();

        let config = HarnessConfig::load_or_default(&dir).unwrap();
        assert_eq!(config.run.jobs, 4);
        assert!(config.run.strict_xfail);
        assert_eq!(config.subjects.convert, "heif-convert");
        assert_eq!(
            config.subject_path(&dir, "heif-info"),
            "/opt/libheif/bin/heif-info"
        );
    }

    #[test]
    fn test_harness_config_rejects_zero_jobs() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        std::fs::write(dir.join(HarnessConfig::FILE_NAME), "[run]\njobs = 0\n").unwrap();
        assert!(HarnessConfig::load_or_default(&dir).is_err());
    }
}
