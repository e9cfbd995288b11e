use crate::infra::{deserialize_date, AppState, InMemoryRoleSessions};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use intern_track::workflows::internship::applications::{
    application_router, ApplicationRepository, DocumentStore, InternshipApplicationService,
};
use intern_track::workflows::internship::calendar::{
    compute_end_date, count_working_days, WeeklyPattern,
};
use intern_track::workflows::internship::commission::{CommissionError, CommissionRoster};
use intern_track::workflows::internship::domain::CommissionMemberId;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct CommissionState {
    pub(crate) roster: Arc<Mutex<CommissionRoster>>,
    pub(crate) sessions: Arc<InMemoryRoleSessions>,
}

pub(crate) fn with_application_routes<R, S>(
    service: Arc<InternshipApplicationService<R, S>>,
    commission: CommissionState,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    application_router(service)
        .merge(commission_router(commission))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/internships/calendar/end-date",
            axum::routing::post(end_date_endpoint),
        )
}

fn commission_router(state: CommissionState) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/v1/internships/commission/:department/members",
            axum::routing::get(commission_members_endpoint),
        )
        .route(
            "/api/v1/internships/commission/:department/chairman",
            axum::routing::put(promote_chairman_endpoint),
        )
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct EndDateRequest {
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) start_date: NaiveDate,
    pub(crate) working_days: u32,
    pub(crate) pattern: WeeklyPattern,
}

#[derive(Debug, Serialize)]
pub(crate) struct EndDateResponse {
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) working_days: u32,
    pub(crate) calendar_days: i64,
    pub(crate) pattern: WeeklyPattern,
    pub(crate) pattern_label: &'static str,
}

pub(crate) async fn end_date_endpoint(Json(payload): Json<EndDateRequest>) -> impl IntoResponse {
    let EndDateRequest {
        start_date,
        working_days,
        pattern,
    } = payload;

    match compute_end_date(start_date, working_days, pattern) {
        Ok(end_date) => {
            debug_assert_eq!(
                count_working_days(start_date, end_date, pattern),
                working_days
            );
            let response = EndDateResponse {
                start_date,
                end_date,
                working_days,
                calendar_days: (end_date - start_date).num_days() + 1,
                pattern,
                pattern_label: pattern.label(),
            };
            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromoteChairmanRequest {
    pub(crate) commission_member_id: String,
}

pub(crate) async fn promote_chairman_endpoint(
    State(state): State<CommissionState>,
    Path(department): Path<String>,
    Json(request): Json<PromoteChairmanRequest>,
) -> impl IntoResponse {
    let mut roster = state.roster.lock().expect("roster mutex poisoned");
    let result = roster.promote_chairman(
        &department,
        &CommissionMemberId(request.commission_member_id),
        state.sessions.as_ref(),
    );

    match result {
        Ok(change) => (StatusCode::OK, Json(json!(change))).into_response(),
        Err(error) => {
            let status = match &error {
                CommissionError::UnknownMember(_) => StatusCode::NOT_FOUND,
                CommissionError::WrongDepartment { .. } | CommissionError::DuplicateMember(_) => {
                    StatusCode::CONFLICT
                }
                CommissionError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": error.to_string() }))).into_response()
        }
    }
}

pub(crate) async fn commission_members_endpoint(
    State(state): State<CommissionState>,
    Path(department): Path<String>,
) -> impl IntoResponse {
    let roster = state.roster.lock().expect("roster mutex poisoned");
    let members: Vec<serde_json::Value> = roster
        .members_of(&department)
        .into_iter()
        .map(|member| {
            json!({
                "commission_member_id": member.id,
                "full_name": member.full_name,
                "role": member.role,
                "role_label": member.role.label(),
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "department": department, "members": members })),
    )
}
