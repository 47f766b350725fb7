mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use common::service_with;
use common::InMemoryRepository;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;
use wellbeing::api::build_router;

fn app(repo: Arc<InMemoryRepository>) -> Router {
    let (service, _) = service_with(repo);
    build_router(Arc::new(service), false, 16)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_version() {
    let (status, body) = send(
        app(Arc::new(InMemoryRepository::new())),
        Method::GET,
        "/api/health",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn classify_accepts_and_rejects_scores() {
    let repo = Arc::new(InMemoryRepository::new());

    let (status, body) = send(
        app(repo.clone()),
        Method::POST,
        "/api/classify",
        Some(json!({"score": -0.7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bucket"], "negative");

    let (status, body) = send(
        app(repo),
        Method::POST,
        "/api/classify",
        Some(json!({"score": 1.5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("1.5"));
}

#[tokio::test]
async fn reputation_of_unknown_employee_is_not_found() {
    let (status, body) = send(
        app(Arc::new(InMemoryRepository::new())),
        Method::GET,
        "/api/employees/42/reputation",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn check_in_is_created() {
    let repo = Arc::new(InMemoryRepository::new());
    let id = repo.add_employee("Ann", Some("eng"));

    let (status, body) = send(
        app(repo),
        Method::POST,
        "/api/check-ins",
        Some(json!({"employee_id": id, "content": "good week", "score": 0.8})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["employee_id"], id);
    assert_eq!(body["data"]["bucket"], "positive");
}

#[tokio::test]
async fn employee_pages_use_camel_case_envelope() {
    let repo = Arc::new(InMemoryRepository::new());
    for i in 0..8 {
        repo.add_employee(&format!("Emp{i}"), Some("eng"));
    }
    let router = app(repo);

    let (status, body) = send(router.clone(), Method::GET, "/api/employees?limit=7", None).await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["items"].as_array().unwrap().len(), 7);
    assert_eq!(page["hasNextPage"], true);
    assert_eq!(page["nextCursor"], 7);

    let (_, body) = send(
        router,
        Method::GET,
        "/api/employees?limit=7&after=7&department=eng",
        None,
    )
    .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["hasNextPage"], false);
    assert_eq!(body["data"]["nextCursor"], Value::Null);
}

#[tokio::test]
async fn cache_endpoints_report_and_evict() {
    let repo = Arc::new(InMemoryRepository::new());
    let id = repo.add_employee("Ann", None);
    repo.add_scores(id, &[0.5]);
    let router = app(repo);

    send(router.clone(), Method::GET, "/api/distribution", None).await;
    send(router.clone(), Method::GET, "/api/distribution", None).await;

    let (_, stats) = send(router.clone(), Method::GET, "/api/cache/stats", None).await;
    assert_eq!(stats["data"]["hits"], 1);
    assert_eq!(stats["data"]["misses"], 1);

    let (status, body) = send(
        router,
        Method::DELETE,
        "/api/cache?pattern=distribution:*",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);
}

#[tokio::test]
async fn blank_department_covers_all_departments() {
    let repo = Arc::new(InMemoryRepository::new());
    let ann = repo.add_employee("Ann", Some("eng"));
    let bob = repo.add_employee("Bob", Some("ops"));
    repo.add_scores(ann, &[0.5]);
    repo.add_scores(bob, &[-0.9]);
    let router = app(repo);

    let (status, body) = send(
        router.clone(),
        Method::GET,
        "/api/distribution?department=",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["department"], Value::Null);

    let (_, body) = send(router, Method::GET, "/api/leaderboard?department=%20", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
