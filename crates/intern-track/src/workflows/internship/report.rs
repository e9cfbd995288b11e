use serde::Serialize;

use super::domain::{ApplicationStatus, RequirementStatus, SubmissionStage};
use super::requirements::RequirementInstance;

#[derive(Debug, Clone, Serialize)]
pub struct StageProgressEntry {
    pub stage: SubmissionStage,
    pub stage_label: &'static str,
    pub approved: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutstandingItem {
    pub requirement_id: String,
    pub name: String,
    pub stage: SubmissionStage,
    pub status: RequirementStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Requirement progress for one application, used by the API and the CLI
/// demo to show where an application stands.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationProgressReport {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub stage_progress: Vec<StageProgressEntry>,
    pub outstanding: Vec<OutstandingItem>,
    pub approved_requirements: usize,
    pub total_requirements: usize,
}

pub(crate) fn progress_report(
    status: ApplicationStatus,
    requirements: &[RequirementInstance],
) -> ApplicationProgressReport {
    let stage_progress = SubmissionStage::ordered()
        .into_iter()
        .map(|stage| {
            let in_stage = requirements.iter().filter(|r| r.stage == stage);
            StageProgressEntry {
                stage,
                stage_label: stage.label(),
                approved: in_stage.clone().filter(|r| r.approved()).count(),
                total: in_stage.count(),
            }
        })
        .collect();

    let mut outstanding: Vec<OutstandingItem> = requirements
        .iter()
        .filter(|r| !r.approved())
        .map(|r| OutstandingItem {
            requirement_id: r.id.0.clone(),
            name: r.name.clone(),
            stage: r.stage,
            status: r.status,
            status_label: r.status.label(),
            rejection_reason: r.rejection_reason.clone(),
        })
        .collect();
    outstanding.sort_by(|a, b| a.requirement_id.cmp(&b.requirement_id));

    ApplicationProgressReport {
        status,
        status_label: status.label(),
        stage_progress,
        outstanding,
        approved_requirements: requirements.iter().filter(|r| r.approved()).count(),
        total_requirements: requirements.len(),
    }
}
