use super::common::*;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
        .expect("request")
}

async fn submit_over_http(router: &axum::Router) -> Value {
    let payload = serde_json::to_value(submission()).expect("serializable submission");
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/internships/applications", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    read_json(response).await
}

fn requirement_id_from(view: &Value, name: &str) -> String {
    view.get("requirements")
        .and_then(Value::as_array)
        .and_then(|requirements| {
            requirements
                .iter()
                .find(|r| r.get("name").and_then(Value::as_str) == Some(name))
        })
        .and_then(|r| r.get("requirement_id"))
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("requirement '{name}' in view"))
        .to_string()
}

#[tokio::test]
async fn post_applications_returns_the_instantiated_requirements() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    assert_eq!(view.get("status"), Some(&json!("pending")));
    assert_eq!(view.get("end_date"), Some(&json!("2025-06-27")));

    let requirements = view
        .get("requirements")
        .and_then(Value::as_array)
        .expect("requirement list");
    assert_eq!(requirements.len(), 5);

    let topic = requirements
        .iter()
        .find(|r| r.get("name").and_then(Value::as_str) == Some("Internship Topic"))
        .expect("topic requirement");
    assert_eq!(topic.get("status"), Some(&json!("Approved")));
}

#[tokio::test]
async fn submitting_against_an_unknown_type_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let mut payload = serde_json::to_value(submission()).expect("serializable submission");
    payload["internship_type"] = json!("type-erasmus");

    let response = router
        .oneshot(json_request("POST", "/api/v1/internships/applications", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(response).await;
    assert!(body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("type-erasmus"));
}

#[tokio::test]
async fn the_application_lifecycle_runs_over_http() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    let application_id = view
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id")
        .to_string();
    let base = format!("/api/v1/internships/applications/{application_id}");

    let mut last = Value::Null;
    for (name, file, tag) in [
        ("Internship Acceptance Form", "acceptance.pdf", "acceptance_form"),
        ("Transcript", "transcript.pdf", "transcript"),
    ] {
        let requirement_id = requirement_id_from(&view, name);
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("{base}/requirements/{requirement_id}/documents"),
                &json!({
                    "file_name": file,
                    "document_type": tag,
                    "content": "signed form scan",
                    "today": "2025-05-20",
                }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        last = read_json(response).await;
    }
    assert_eq!(last.get("status"), Some(&json!("ready_for_assignment")));

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("{base}/assign"),
            &json!({ "commission_member_id": "cm-1", "today": "2025-05-21" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let assigned = read_json(response).await;
    assert_eq!(assigned.get("status"), Some(&json!("assigned")));

    for name in ["Internship Acceptance Form", "Transcript"] {
        let requirement_id = requirement_id_from(&view, name);
        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("{base}/requirements/{requirement_id}/approve"),
                &json!({ "today": "2025-05-22" }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        last = read_json(response).await;
    }
    assert_eq!(last.get("status"), Some(&json!("application_approved")));
}

#[tokio::test]
async fn a_duplicate_approval_conflicts() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    let application_id = view
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id")
        .to_string();
    let requirement_id = requirement_id_from(&view, "Internship Acceptance Form");
    let base = format!(
        "/api/v1/internships/applications/{application_id}/requirements/{requirement_id}"
    );

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{base}/documents"),
            &json!({
                "file_name": "acceptance.pdf",
                "document_type": "acceptance_form",
                "content": "signed form scan",
                "today": "2025-05-20",
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let approve = json!({ "today": "2025-05-21" });
    let response = router
        .clone()
        .oneshot(json_request("PUT", &format!("{base}/approve"), &approve))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(json_request("PUT", &format!("{base}/approve"), &approve))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert!(body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("already decided"));
}

#[tokio::test]
async fn rejecting_without_a_reason_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    let application_id = view
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id")
        .to_string();
    let requirement_id = requirement_id_from(&view, "Transcript");
    let base = format!(
        "/api/v1/internships/applications/{application_id}/requirements/{requirement_id}"
    );

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{base}/documents"),
            &json!({
                "file_name": "transcript.pdf",
                "document_type": "transcript",
                "content": "grades",
                "today": "2025-05-20",
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("{base}/reject"),
            &json!({ "reason": "", "today": "2025-05-21" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_applications_are_not_found() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/internships/applications/app-missing")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_reports_are_served() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    let application_id = view
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id");

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/api/v1/internships/applications/{application_id}/progress"
                ))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let report = read_json(response).await;
    assert_eq!(report.get("total_requirements"), Some(&json!(5)));
    assert_eq!(report.get("approved_requirements"), Some(&json!(1)));
    let stages = report
        .get("stage_progress")
        .and_then(Value::as_array)
        .expect("stage progress");
    assert_eq!(stages.len(), 2);
}

#[tokio::test]
async fn uploaded_documents_can_be_downloaded() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let view = submit_over_http(&router).await;
    let application_id = view
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id")
        .to_string();
    let requirement_id = requirement_id_from(&view, "Transcript");
    let base = format!(
        "/api/v1/internships/applications/{application_id}/requirements/{requirement_id}"
    );

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{base}/documents"),
            &json!({
                "file_name": "transcript.pdf",
                "document_type": "transcript",
                "content": "grades",
                "today": "2025-05-20",
            }),
        ))
        .await
        .expect("router dispatch");
    let uploaded = read_json(response).await;
    let document_id = uploaded
        .get("requirements")
        .and_then(Value::as_array)
        .and_then(|requirements| {
            requirements
                .iter()
                .find(|r| r.get("requirement_id").and_then(Value::as_str)
                    == Some(requirement_id.as_str()))
        })
        .and_then(|r| r.get("documents"))
        .and_then(Value::as_array)
        .and_then(|documents| documents.first())
        .and_then(|d| d.get("document_id"))
        .and_then(Value::as_str)
        .expect("document id")
        .to_string();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("{base}/documents/{document_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 1024).await.expect("body");
    assert_eq!(&bytes[..], b"grades");
}
