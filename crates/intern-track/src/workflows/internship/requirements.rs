use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{Document, RequirementId, RequirementStatus, RuleKind, SubmissionStage};

/// Violations of a requirement's approval state machine. Every variant
/// carries the state the instance was actually in so the caller can
/// reconcile without a second fetch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequirementError {
    #[error("requirement '{id}' is a {kind} rule and does not accept document uploads")]
    InvalidRuleType { id: String, kind: RuleKind },
    #[error("requirement '{id}' is not awaiting an upload (currently {status})")]
    NotAwaitingUpload {
        id: String,
        status: RequirementStatus,
    },
    #[error("requirement '{id}' is not pending review (currently {status})")]
    NotPending {
        id: String,
        status: RequirementStatus,
    },
    #[error("a rejection requires a non-empty reason")]
    MissingReason,
    #[error("requirement '{id}' was already decided (currently {status})")]
    AlreadyDecided {
        id: String,
        status: RequirementStatus,
    },
}

/// Live, per-application copy of a rule template.
///
/// The name, description, kind, and stage are snapshotted at instantiation
/// time so later catalog edits never alter in-flight applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementInstance {
    pub id: RequirementId,
    pub name: String,
    pub description: String,
    pub kind: RuleKind,
    pub stage: SubmissionStage,
    pub accepted_document_types: Vec<String>,
    pub status: RequirementStatus,
    pub documents: Vec<Document>,
    pub rejection_reason: Option<String>,
}

impl RequirementInstance {
    /// Attach an uploaded document and advance the instance toward review.
    ///
    /// Valid for document rules awaiting an upload or previously rejected
    /// (the resubmission path, which clears the recorded reason). An upload
    /// while already pending review replaces the pending submission by
    /// adding a further document without changing state.
    pub fn attach_upload(&mut self, document: Document) -> Result<(), RequirementError> {
        if self.kind != RuleKind::Document {
            return Err(RequirementError::InvalidRuleType {
                id: self.id.0.clone(),
                kind: self.kind,
            });
        }

        match self.status {
            RequirementStatus::WaitingForUpload | RequirementStatus::Rejected => {
                self.documents.push(document);
                self.rejection_reason = None;
                self.status = RequirementStatus::WaitingForApproval;
                Ok(())
            }
            RequirementStatus::WaitingForApproval => {
                self.documents.push(document);
                Ok(())
            }
            RequirementStatus::Approved => Err(RequirementError::NotAwaitingUpload {
                id: self.id.0.clone(),
                status: self.status,
            }),
        }
    }

    /// Approve the instance.
    ///
    /// Document rules must be pending review. Topic rules are decided
    /// directly by the commission, so the review window also covers the
    /// initial waiting state and a prior rejection (which is cleared).
    pub fn approve(&mut self) -> Result<(), RequirementError> {
        if self.status == RequirementStatus::Approved {
            return Err(RequirementError::AlreadyDecided {
                id: self.id.0.clone(),
                status: self.status,
            });
        }

        if !self.decidable() {
            return Err(RequirementError::NotPending {
                id: self.id.0.clone(),
                status: self.status,
            });
        }

        self.status = RequirementStatus::Approved;
        self.rejection_reason = None;
        Ok(())
    }

    /// Reject the instance with a mandatory, non-empty reason.
    pub fn reject(&mut self, reason: &str) -> Result<(), RequirementError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RequirementError::MissingReason);
        }

        match self.status {
            RequirementStatus::Approved | RequirementStatus::Rejected => {
                Err(RequirementError::AlreadyDecided {
                    id: self.id.0.clone(),
                    status: self.status,
                })
            }
            _ if self.decidable() => {
                self.status = RequirementStatus::Rejected;
                self.rejection_reason = Some(reason.to_string());
                Ok(())
            }
            _ => Err(RequirementError::NotPending {
                id: self.id.0.clone(),
                status: self.status,
            }),
        }
    }

    /// Whether the commission may decide this instance in its current state.
    fn decidable(&self) -> bool {
        match self.kind {
            RuleKind::Document => self.status == RequirementStatus::WaitingForApproval,
            RuleKind::Topic => matches!(
                self.status,
                RequirementStatus::WaitingForUpload
                    | RequirementStatus::WaitingForApproval
                    | RequirementStatus::Rejected
            ),
        }
    }

    pub fn approved(&self) -> bool {
        self.status == RequirementStatus::Approved
    }
}
