use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dm_common::artifacts::{ArtifactError, ArtifactManifest, ScoringResources};
use dm_common::classifier::{Classifier, LogisticRegressionModel};
use dm_common::config::ScoringConfig;
use dm_common::error::{ClassifierError, RankError};
use dm_common::evaluation::{evaluate, EvaluationError, EvaluationReport};
use dm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use dm_common::matching::{FeatureTable, RankingEngine, RankingRun, FEATURE_COLUMNS};
use dm_common::records::{load_candidates, load_jobs};
use dm_common::skill_catalog::SkillMatchMode;
use dotenvy::dotenv;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "dm-cli", about = "Offline tooling for candidate ranking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Precompute candidate features and fit the TF-IDF vectorizer
    BuildArtifacts {
        /// Applicants file keyed by candidate id
        #[arg(long, env = "DM_APPLICANTS_PATH")]
        applicants: PathBuf,
        #[arg(long, env = "DM_ARTIFACTS_DIR", default_value = "artifacts")]
        out: PathBuf,
        /// Overrides DM_SKILL_MATCH_MODE
        #[arg(long)]
        skill_match_mode: Option<SkillMatchMode>,
        /// Keep candidates whose résumé never mentions qualifications
        #[arg(long)]
        no_qualification_filter: bool,
    },
    /// Rank precomputed candidates for one job and print the result as JSON
    Rank {
        #[arg(long, env = "DM_ARTIFACTS_DIR", default_value = "artifacts")]
        artifacts: PathBuf,
        #[arg(long, env = "DM_MODEL_PATH")]
        model: PathBuf,
        #[arg(long, env = "DM_JOBS_PATH")]
        jobs: PathBuf,
        #[arg(long)]
        job_id: String,
        /// Overrides DM_TOP_N
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Score a held-out feature set and print metrics as JSON
    Evaluate {
        #[arg(long, env = "DM_MODEL_PATH")]
        model: PathBuf,
        /// JSON lines, one feature object per row
        #[arg(long)]
        x_test: PathBuf,
        /// JSON lines, one 0/1 label per row
        #[arg(long)]
        y_test: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Rank(#[from] RankError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("job not found: {0}")]
    UnknownJob(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

fn build_artifacts(
    applicants: &Path,
    out: &Path,
    config: &ScoringConfig,
) -> Result<ArtifactManifest, CliError> {
    let candidates = load_candidates(applicants)?;
    info!(candidates = candidates.len(), path = %applicants.display(), "loaded applicants");

    let resources = ScoringResources::build(&candidates, config);
    resources.save_to_dir(out)?;
    Ok(resources.manifest())
}

fn rank_job(
    artifacts: &Path,
    model: &Path,
    jobs: &Path,
    job_id: &str,
    top_n: Option<usize>,
    config: ScoringConfig,
) -> Result<RankingRun, CliError> {
    let resources = ScoringResources::load_from_dir(artifacts)?;
    let classifier: Arc<dyn Classifier> = Arc::new(LogisticRegressionModel::load(model)?);
    let jobs = load_jobs(jobs)?;
    let job = jobs
        .iter()
        .find(|job| job.id == job_id)
        .ok_or_else(|| CliError::UnknownJob(job_id.to_string()))?;

    let engine = RankingEngine::new(Arc::new(resources), classifier, config);
    Ok(engine.rank_job(job, top_n)?)
}

fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads feature rows into a table with the canonical column order.
fn read_feature_rows(path: &Path) -> Result<FeatureTable, CliError> {
    let parse_error = |line: usize, reason: String| CliError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let rows = read_lines(path)?
        .into_iter()
        .map(|(line, text)| {
            let object: serde_json::Map<String, Value> =
                serde_json::from_str(&text).map_err(|err| parse_error(line, err.to_string()))?;
            FEATURE_COLUMNS
                .iter()
                .map(|column| {
                    object
                        .get(*column)
                        .and_then(as_number)
                        .ok_or_else(|| parse_error(line, format!("missing or non-numeric `{column}`")))
                })
                .collect::<Result<Vec<f64>, CliError>>()
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    Ok(FeatureTable {
        columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

fn read_labels(path: &Path) -> Result<Vec<bool>, CliError> {
    read_lines(path)?
        .into_iter()
        .map(|(line, text)| {
            let value: Value = serde_json::from_str(&text).map_err(|err| CliError::Parse {
                path: path.to_path_buf(),
                line,
                reason: err.to_string(),
            })?;
            match as_number(&value) {
                Some(v) if v == 0.0 => Ok(false),
                Some(v) if v == 1.0 => Ok(true),
                _ => Err(CliError::Parse {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("label must be 0 or 1, got {value}"),
                }),
            }
        })
        .collect()
}

fn evaluate_model(model: &Path, x_test: &Path, y_test: &Path) -> Result<EvaluationReport, CliError> {
    let model = LogisticRegressionModel::load(model)?;
    let features = read_feature_rows(x_test)?;
    let labels = read_labels(y_test)?;

    let scores = model.predict_proba(&features)?;
    Ok(evaluate(&labels, &scores)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = ScoringConfig::from_env();

    match cli.command {
        Command::BuildArtifacts {
            applicants,
            out,
            skill_match_mode,
            no_qualification_filter,
        } => {
            let config = ScoringConfig {
                skill_match_mode: skill_match_mode.unwrap_or(config.skill_match_mode),
                qualification_filter: config.qualification_filter && !no_qualification_filter,
                ..config
            };
            print_json(&build_artifacts(&applicants, &out, &config)?)
        }
        Command::Rank {
            artifacts,
            model,
            jobs,
            job_id,
            top_n,
        } => print_json(&rank_job(&artifacts, &model, &jobs, &job_id, top_n, config)?),
        Command::Evaluate {
            model,
            x_test,
            y_test,
        } => print_json(&evaluate_model(&model, &x_test, &y_test)?),
    }
}

fn main() {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    if let Err(err) = run(Cli::parse()) {
        tracing::error!(error = %err, "dm-cli failed");
        eprintln!("dm-cli: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dm-cli-{tag}-{}",
            dm_common::run_id::ranking_run_id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn model_json() -> String {
        serde_json::json!({
            "feature_names": FEATURE_COLUMNS,
            "coefficients": [3.0, 1.0, 0.2, 1.0, 0.5, 2.0, 0.5],
            "intercept": -3.5
        })
        .to_string()
    }

    fn applicants_json() -> &'static str {
        r#"{
            "101": {
                "cv_pt": "Minhas qualificações incluem 6 anos com Python e Django.",
                "infos_basicas": {"nome": "Ana"},
                "informacoes_profissionais": {"conhecimentos_tecnicos": "Python, Docker"},
                "formacao_e_idiomas": {"nivel_ingles": "Fluente"}
            },
            "102": {
                "cv_pt": "Qualificações: consultor SAP.",
                "infos_basicas": {"nome": "Bruno"}
            },
            "103": {
                "cv_pt": "Sem menção ao termo.",
                "infos_basicas": {"nome": "Caio"}
            }
        }"#
    }

    fn jobs_json() -> &'static str {
        r#"{
            "5185": {
                "informacoes_basicas": {"titulo_vaga": "Desenvolvedor Python", "vaga_sap": "Não"},
                "perfil_vaga": {"principais_atividades": "APIs com Django e Docker", "nivel_ingles": "Avançado"}
            }
        }"#
    }

    #[test]
    fn builds_then_ranks() {
        let dir = scratch_dir("rank");
        let applicants = write(&dir, "applicants.json", applicants_json());
        let jobs = write(&dir, "vagas.json", jobs_json());
        let model = write(&dir, "model.json", &model_json());
        let artifacts = dir.join("artifacts");

        let manifest = build_artifacts(&applicants, &artifacts, &ScoringConfig::default()).unwrap();
        assert_eq!(manifest.candidate_count, 2);

        let run = rank_job(&artifacts, &model, &jobs, "5185", Some(5), ScoringConfig::default()).unwrap();
        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].id, "101");
        assert_eq!(run.results[0].name, "Ana");

        let err = rank_job(&artifacts, &model, &jobs, "9999", None, ScoringConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::UnknownJob(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn evaluates_json_lines() {
        let dir = scratch_dir("eval");
        let model = write(&dir, "model.json", &model_json());
        let good = r#"{"text_similarity":0.8,"english_match":1,"spanish_match":1,"sap_match":1,"experience_match":1,"skills_match_score":1.0,"seniority_match":1}"#;
        let bad = r#"{"text_similarity":0.0,"english_match":0,"spanish_match":0,"sap_match":0,"experience_match":0,"skills_match_score":0.0,"seniority_match":0}"#;
        let x_test = write(&dir, "X_test.json", &format!("{good}\n{bad}\n{good}\n{bad}\n"));
        let y_test = write(&dir, "y_test.json", "1\n0\n1\n0\n");

        let report = evaluate_model(&model, &x_test, &y_test).unwrap();
        assert_eq!(report.samples, 4);
        assert_eq!(report.positives, 2);
        assert!((report.average_precision - 1.0).abs() < 1e-9);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_feature_column_names_the_line() {
        let dir = scratch_dir("missing");
        let x_test = write(&dir, "X_test.json", "{\"text_similarity\": 0.1}\n");

        let err = read_feature_rows(&x_test).unwrap_err();
        assert!(matches!(err, CliError::Parse { line: 1, .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn labels_accept_numbers_and_booleans() {
        let dir = scratch_dir("labels");
        let y_test = write(&dir, "y_test.json", "1\nfalse\n\"0\"\n");
        assert_eq!(read_labels(&y_test).unwrap(), vec![true, false, false]);

        let y_bad = write(&dir, "y_bad.json", "2\n");
        assert!(read_labels(&y_bad).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from([
            "dm-cli",
            "build-artifacts",
            "--applicants",
            "applicants.json",
            "--out",
            "out",
            "--skill-match-mode",
            "word_boundary",
        ]);
        match cli.command {
            Command::BuildArtifacts {
                skill_match_mode, ..
            } => assert_eq!(skill_match_mode, Some(SkillMatchMode::WordBoundary)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
