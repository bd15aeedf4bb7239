use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
    http::Method,
    http::Request,
    middleware,
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use clap::Parser;
use dm_common::artifacts::ScoringResources;
use dm_common::classifier::{Classifier, LogisticRegressionModel};
use dm_common::config::ScoringConfig;
use dm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use dm_common::matching::{RankingEngine, FEATURE_COLUMNS};
use dm_common::records::load_jobs;
use dm_common::{Candidate, Job};
use dotenvy::dotenv;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod handlers;

use error::ApiError;
use handlers::{health, jobs, matches};

const SHUTDOWN_DRAIN_GRACE: std::time::Duration = std::time::Duration::from_millis(200);

#[derive(Debug, Clone, Parser)]
#[command(name = "dm-api", about = "HTTP API ranking candidates for job openings")]
struct Cli {
    /// Directory produced by `dm-cli build-artifacts`
    #[arg(long, env = "DM_ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts_dir: PathBuf,

    /// Logistic regression model exported as JSON
    #[arg(long, env = "DM_MODEL_PATH")]
    model_path: PathBuf,

    /// Job openings file (keyed by job id)
    #[arg(long, env = "DM_JOBS_PATH")]
    jobs_path: PathBuf,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "DM_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    fn from_cli(cli: &Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::BadRequest(
                "DM_CORS_ORIGINS must list explicit origins".into(),
            ));
        }

        Ok(Self {
            port: cli.port,
            cors_origins,
            scoring: ScoringConfig::from_env(),
        })
    }

    pub fn for_tests() -> Self {
        Self {
            port: 3001,
            cors_origins: vec!["http://localhost:3000".into()],
            scoring: ScoringConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: RankingEngine,
    pub jobs: Arc<Vec<Job>>,
    pub config: AppConfig,
    pub readiness: Arc<AtomicBool>,
}

impl AppState {
    pub fn find_job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == job_id)
    }
}

pub type SharedState = Arc<AppState>;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    error::with_request_id(request_id, next.run(req)).await
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let api_routes = Router::new()
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/:job_id", get(jobs::get_job))
        .route("/jobs/:job_id/candidates", get(matches::list_matches));

    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid::default(),
        ))
        .layer(cors)
        .with_state(state)
}

fn fixture_jobs() -> Vec<Job> {
    vec![
        Job {
            id: "v-python".into(),
            title: Some("Desenvolvedor Python Sênior".into()),
            activities: Some("Desenvolvimento de APIs REST com Django.".into()),
            competencies: Some("Experiência com Python, Django e Docker.".into()),
            english_level: Some("Avançado".into()),
            seniority: Some("Sênior".into()),
            client: Some("Acme".into()),
            area: Some("TI - Desenvolvimento".into()),
            ..Default::default()
        },
        Job {
            id: "v-sap".into(),
            title: Some("Consultor SAP FI".into()),
            activities: Some("Implantação de módulos SAP.".into()),
            sap_required: true,
            english_level: Some("Básico".into()),
            client: Some("Globex".into()),
            area: Some("TI - SAP".into()),
            ..Default::default()
        },
    ]
}

fn fixture_candidates() -> Vec<Candidate> {
    let candidate = |id: &str, name: &str, resume: &str, english: &str| Candidate {
        id: id.into(),
        name: Some(name.into()),
        resume: Some(resume.into()),
        english_level: Some(english.into()),
        professional_level: Some("Sênior".into()),
        ..Default::default()
    };

    vec![
        candidate(
            "c-101",
            "Ana Souza",
            "Qualificações: 6 anos com Python, Django, Docker e APIs REST.",
            "Fluente",
        ),
        candidate(
            "c-102",
            "Bruno Lima",
            "Qualificações: consultor SAP FI há 8 anos.",
            "Intermediário",
        ),
        candidate(
            "c-103",
            "Carla Dias",
            "Qualificações: desenvolvedora Java e Spring, 2 anos.",
            "Básico",
        ),
    ]
}

fn fixture_classifier() -> LogisticRegressionModel {
    LogisticRegressionModel {
        feature_names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        coefficients: vec![3.0, 1.0, 0.2, 1.0, 0.5, 2.0, 0.5],
        intercept: -3.5,
    }
}

/// In-memory state over `candidates` and two fixture jobs (`v-python`, `v-sap`).
pub fn test_state_with(candidates: &[Candidate]) -> SharedState {
    let config = AppConfig::for_tests();
    let resources = ScoringResources::build(candidates, &config.scoring);
    let engine = RankingEngine::new(
        Arc::new(resources),
        Arc::new(fixture_classifier()),
        config.scoring,
    );

    Arc::new(AppState {
        engine,
        jobs: Arc::new(fixture_jobs()),
        config,
        readiness: Arc::new(AtomicBool::new(true)),
    })
}

pub fn test_state() -> SharedState {
    test_state_with(&fixture_candidates())
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;

    let resources = ScoringResources::load_from_dir(&cli.artifacts_dir)?;
    let classifier: Arc<dyn Classifier> = Arc::new(LogisticRegressionModel::load(&cli.model_path)?);
    let jobs = load_jobs(&cli.jobs_path)?;
    info!(jobs = jobs.len(), path = %cli.jobs_path.display(), "loaded jobs");

    let state = Arc::new(AppState {
        engine: RankingEngine::new(Arc::new(resources), classifier, config.scoring),
        jobs: Arc::new(jobs),
        config: config.clone(),
        readiness: Arc::new(AtomicBool::new(true)),
    });

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(%addr, top_n = config.scoring.top_n, "dm-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn sets_request_id_when_missing() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn cli_config_rejects_wildcard_cors() {
        let cli = Cli::parse_from([
            "dm-api",
            "--model-path",
            "model.json",
            "--jobs-path",
            "vagas.json",
            "--cors-origins",
            "*",
        ]);
        assert!(matches!(AppConfig::from_cli(&cli), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn cli_config_splits_origins() {
        let cli = Cli::parse_from([
            "dm-api",
            "--model-path",
            "model.json",
            "--jobs-path",
            "vagas.json",
            "--cors-origins",
            "http://a.test, http://b.test,",
        ]);
        let config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn state_finds_jobs_by_id() {
        let state = test_state();
        assert!(state.find_job("v-sap").is_some());
        assert!(state.find_job("missing").is_none());
    }
}
