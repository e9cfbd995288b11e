use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::super::catalog::CatalogError;
use super::super::domain::{ApplicationId, CommissionMemberId, DocumentId, RequirementId};
use super::super::requirements::RequirementError;
use super::domain::{ApplicationSubmission, DocumentUpload};
use super::repository::{ApplicationRepository, DocumentStore, RepositoryError};
use super::service::{ApplicationServiceError, InternshipApplicationService};

/// Router builder exposing the application lifecycle over HTTP.
pub fn application_router<R, S>(service: Arc<InternshipApplicationService<R, S>>) -> Router
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/internships/applications",
            post(submit_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id",
            get(get_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/progress",
            get(progress_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/assign",
            put(assign_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/reject",
            put(reject_application_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/ready",
            put(mark_ready_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/requirements/:requirement_id/documents",
            post(upload_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/requirements/:requirement_id/documents/:document_id",
            get(document_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/requirements/:requirement_id/approve",
            put(approve_handler::<R, S>),
        )
        .route(
            "/api/v1/internships/applications/:application_id/requirements/:requirement_id/reject",
            put(reject_requirement_handler::<R, S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayRequest {
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    file_name: String,
    document_type: String,
    #[serde(default)]
    description: String,
    content: String,
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    reason: String,
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    commission_member_id: String,
    today: Option<NaiveDate>,
}

fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let today = today_or_now(None);
    match service.submit(submission, today) {
        Ok(record) => {
            (StatusCode::ACCEPTED, axum::Json(record.application.view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id, today_or_now(None)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.progress(&id, today_or_now(None)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path((application_id, requirement_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<UploadRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let UploadRequest {
        file_name,
        document_type,
        description,
        content,
        today,
    } = request;

    let upload = DocumentUpload {
        file_name,
        document_type,
        description,
        content: content.into_bytes(),
    };

    match service.upload_document(
        &ApplicationId(application_id),
        &RequirementId(requirement_id),
        upload,
        today_or_now(today),
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path((application_id, requirement_id, document_id)): Path<(String, String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    match service.document(
        &ApplicationId(application_id),
        &RequirementId(requirement_id),
        &DocumentId(document_id),
    ) {
        Ok((document, bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path((application_id, requirement_id)): Path<(String, String)>,
    request: Option<axum::Json<TodayRequest>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let today = today_or_now(request.and_then(|axum::Json(r)| r.today));
    match service.approve_requirement(
        &ApplicationId(application_id),
        &RequirementId(requirement_id),
        today,
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_requirement_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path((application_id, requirement_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    match service.reject_requirement(
        &ApplicationId(application_id),
        &RequirementId(requirement_id),
        &request.reason,
        today_or_now(request.today),
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<AssignRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    match service.record_assignment(
        &ApplicationId(application_id),
        CommissionMemberId(request.commission_member_id),
        today_or_now(request.today),
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_application_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    match service.reject_application(
        &ApplicationId(application_id),
        &request.reason,
        today_or_now(request.today),
    ) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mark_ready_handler<R, S>(
    State(service): State<Arc<InternshipApplicationService<R, S>>>,
    Path(application_id): Path<String>,
    request: Option<axum::Json<TodayRequest>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    let today = today_or_now(request.and_then(|axum::Json(r)| r.today));
    match service.mark_ready_for_assignment(&ApplicationId(application_id), today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Map engine errors onto HTTP statuses. State-precondition violations are
/// conflicts; malformed input is unprocessable; unknown resources are 404.
fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::ApplicationNotFound(_)
        | ApplicationServiceError::RequirementNotFound(_)
        | ApplicationServiceError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Catalog(CatalogError::UnknownType(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApplicationServiceError::Catalog(_) => StatusCode::CONFLICT,
        ApplicationServiceError::Calendar(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::Requirement(RequirementError::MissingReason)
        | ApplicationServiceError::MissingRejectionReason => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::Requirement(_) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(_) | ApplicationServiceError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = json!({ "error": error.to_string() });
    (status, axum::Json(body)).into_response()
}
