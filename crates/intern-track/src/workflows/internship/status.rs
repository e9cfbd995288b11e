//! Aggregate status machine for an application.
//!
//! A pure fold over the requirement instances plus the externally supplied
//! facts (assignment, explicit rejection, the injected "today"). The service
//! recomputes the aggregate inside the same repository update as the
//! triggering requirement transition, so callers never observe a torn state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, RequirementStatus, RuleKind, SubmissionStage};
use super::requirements::RequirementInstance;

/// Dials governing how the aggregate status advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPolicy {
    /// Advance to ready-for-assignment automatically once every
    /// application-stage document requirement has at least one upload. When
    /// false, an administrative mark-ready action is the trigger.
    pub auto_ready_for_assignment: bool,
    /// Whether a rejected requirement leaves the application in flight so
    /// the student can re-upload. When false, one rejected
    /// application-stage requirement rejects the whole application.
    pub allow_resubmission: bool,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            auto_ready_for_assignment: true,
            allow_resubmission: true,
        }
    }
}

pub(crate) struct StatusInputs<'a> {
    pub requirements: &'a [RequirementInstance],
    pub assigned: bool,
    pub ready_override: bool,
    pub explicitly_rejected: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub today: NaiveDate,
}

pub(crate) fn next_status(
    current: ApplicationStatus,
    policy: &StatusPolicy,
    inputs: &StatusInputs<'_>,
) -> ApplicationStatus {
    if current.is_terminal() {
        return current;
    }

    if inputs.explicitly_rejected {
        return ApplicationStatus::Rejected;
    }

    let application_stage = || {
        inputs
            .requirements
            .iter()
            .filter(|r| r.stage == SubmissionStage::Application)
    };

    if !policy.allow_resubmission
        && application_stage().any(|r| r.status == RequirementStatus::Rejected)
    {
        return ApplicationStatus::Rejected;
    }

    let application_approved = application_stage().all(RequirementInstance::approved);
    let submissions_approved = inputs
        .requirements
        .iter()
        .filter(|r| r.stage == SubmissionStage::Submission)
        .all(RequirementInstance::approved);

    let computed = if application_approved && inputs.assigned {
        if inputs.today >= inputs.end_date && submissions_approved {
            ApplicationStatus::Completed
        } else if inputs.today >= inputs.start_date {
            ApplicationStatus::InProgress
        } else {
            ApplicationStatus::ApplicationApproved
        }
    } else if inputs.assigned {
        ApplicationStatus::Assigned
    } else if ready_for_assignment(policy, inputs) {
        ApplicationStatus::ReadyForAssignment
    } else {
        ApplicationStatus::Pending
    };

    if computed.rank() >= current.rank() {
        computed
    } else {
        current
    }
}

/// An application is ready for the commission once every application-stage
/// document requirement has something to review. Auto-approved topic
/// requirements never block this.
fn ready_for_assignment(policy: &StatusPolicy, inputs: &StatusInputs<'_>) -> bool {
    if inputs.ready_override {
        return true;
    }
    if !policy.auto_ready_for_assignment {
        return false;
    }

    inputs
        .requirements
        .iter()
        .filter(|r| r.stage == SubmissionStage::Application && r.kind == RuleKind::Document)
        .all(|r| !r.documents.is_empty())
}
