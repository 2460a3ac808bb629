use anyhow::{Context, Result};
use camino::Utf8Path;
use heifreg_core::{
    CorpusProvisioner, Environment, HarnessConfig, ProcessRunner, Subjects, Suite, SuiteOptions,
    TestMatrix,
};
use tracing::info;

fn load_settings(data_dir: &Utf8Path, config: Option<&Utf8Path>) -> Result<HarnessConfig> {
    let settings = match config {
        Some(path) => HarnessConfig::load_from_path(path)?,
        None => HarnessConfig::load_or_default(data_dir)?,
    };
    Ok(settings)
}

/// Load both documents and make sure the corpus is on disk. Either failing
/// ends the session before any case runs.
fn open_environment(data_dir: &Utf8Path, settings: &HarnessConfig) -> Result<Environment> {
    let provisioner = CorpusProvisioner::git(settings.corpus.remote.clone());
    let env = Environment::open(data_dir, &provisioner)
        .with_context(|| format!("Failed to prepare test environment in {data_dir}"))?;
    Ok(env)
}

pub fn provision(data_dir: &Utf8Path, config: Option<&Utf8Path>) -> Result<()> {
    let settings = load_settings(data_dir, config)?;
    let env = open_environment(data_dir, &settings)?;
    info!("Corpus ready at {}", env.corpus_root());
    Ok(())
}

/// Run the whole matrix and print the report. Returns whether the suite
/// passed.
pub fn run(
    data_dir: &Utf8Path,
    config: Option<&Utf8Path>,
    jobs: Option<usize>,
    report_path: Option<&Utf8Path>,
) -> Result<bool> {
    let settings = load_settings(data_dir, config)?;
    let env = open_environment(data_dir, &settings)?;

    let subjects = Subjects {
        heif_info: settings.subject_path(data_dir, &settings.subjects.info),
        heif_convert: settings.subject_path(data_dir, &settings.subjects.convert),
    };
    info!("heif-info: {}", subjects.heif_info);
    info!("heif-convert: {}", subjects.heif_convert);

    let mut options = SuiteOptions::from(&settings.run);
    if let Some(jobs) = jobs {
        options.jobs = jobs.max(1);
    }

    let matrix = TestMatrix::conformance();
    let suite = Suite::new(&env, &subjects, ProcessRunner, options);
    let report = suite.run(&matrix)?;

    println!("{report}");

    if let Some(path) = report_path {
        report.write_json(path)?;
        info!("Report written to {}", path);
    }

    Ok(report.is_success())
}

pub fn limitations() {
    let matrix = TestMatrix::conformance();
    for (filename, reason) in matrix.known_limitations() {
        println!("{filename}: {reason}");
    }
}
