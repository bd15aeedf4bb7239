use axum::{body::Body, http::Request, http::StatusCode, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app.clone(), "/livez").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidates"], 3);
}

#[tokio::test]
async fn ranks_candidates_for_a_job() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app, "/api/jobs/v-python/candidates?top_n=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_id"], "v-python");
    assert_eq!(body["candidates_scored"], 3);

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["ID"], "c-101");
    assert_eq!(candidates[0]["Nome"], "Ana Souza");
    assert!(candidates[0]["Score"].as_f64().unwrap() >= candidates[1]["Score"].as_f64().unwrap());
    assert_eq!(candidates[0]["explanation"]["vaga_req_ingles"], "Avançado");
    assert_eq!(candidates[0]["explanation"]["candidato_tem_ingles"], "Fluente");
    assert!(candidates[0]["matched_skills"]
        .as_array()
        .unwrap()
        .contains(&Value::from("python")));
    assert!(candidates[1]["missing_skills"].is_array());
}

#[tokio::test]
async fn duplicate_candidate_ids_keep_their_own_explanations() {
    let candidate = |english: &str| dm_common::Candidate {
        id: "c-dup".into(),
        name: Some("Homônimo".into()),
        resume: Some("Qualificações: Python e Django.".into()),
        english_level: Some(english.into()),
        ..Default::default()
    };
    let app = dm_api::create_router(dm_api::test_state_with(&[
        candidate("Básico"),
        candidate("Fluente"),
    ]));

    let (status, body) = get_json(app, "/api/jobs/v-python/candidates").await;
    assert_eq!(status, StatusCode::OK);

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    for candidate in candidates {
        let expected = if candidate["english_match"] == 1 { "Fluente" } else { "Básico" };
        assert_eq!(candidate["explanation"]["candidato_tem_ingles"], expected);
    }
}

#[tokio::test]
async fn sap_job_prefers_sap_candidate() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app, "/api/jobs/v-sap/candidates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidates"][0]["ID"], "c-102");
    assert_eq!(body["candidates"][0]["sap_match"], 1);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app, "/api/jobs/nope/candidates").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn invalid_top_n_is_bad_request() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, _) = get_json(app, "/api/jobs/v-python/candidates?top_n=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_candidate_pool_returns_empty_list() {
    let app = dm_api::create_router(dm_api::test_state_with(&[]));

    let (status, body) = get_json(app, "/api/jobs/v-python/candidates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidates"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn job_list_applies_filters() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app.clone(), "/api/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = get_json(app.clone(), "/api/jobs?sap=Sim").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["jobs"][0]["id"], "v-sap");

    let (status, body) = get_json(app.clone(), "/api/jobs?min_english=Avan%C3%A7ado&skills=python").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"][0]["id"], "v-python");

    let (status, _) = get_json(app, "/api/jobs?min_english=Nativo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_detail_and_missing_job() {
    let app = dm_api::create_router(dm_api::test_state());

    let (status, body) = get_json(app.clone(), "/api/jobs/v-sap").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sap_required"], true);

    let (status, _) = get_json(app, "/api/jobs/v-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
