use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for submitted internship applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier for one requirement instance within an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequirementId(pub String);

/// Identifier for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Identifier for an internship type in the requirement catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InternshipTypeId(pub String);

/// Identifier for a commission member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommissionMemberId(pub String);

/// Storage reference handed back by the document store. The engine keeps the
/// reference only, never file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef(pub String);

/// Whether a requirement is satisfied by an uploaded document or by a topic
/// the commission confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Document,
    Topic,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a requirement is due when the student applies or during/after the
/// internship itself (e.g. the journal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    Application,
    Submission,
}

impl SubmissionStage {
    pub const fn ordered() -> [Self; 2] {
        [Self::Application, Self::Submission]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Submission => "Submission",
        }
    }
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Approval lifecycle of a single requirement instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    WaitingForUpload,
    WaitingForApproval,
    Approved,
    Rejected,
}

impl RequirementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaitingForUpload => "Waiting for Upload",
            Self::WaitingForApproval => "Waiting for Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall lifecycle of an application, from submission to internship
/// completion. Terminal states are retained for audit, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    ReadyForAssignment,
    Assigned,
    ApplicationApproved,
    Rejected,
    InProgress,
    Completed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::ReadyForAssignment => "Ready for Assignment",
            Self::Assigned => "Assigned",
            Self::ApplicationApproved => "Application Approved",
            Self::Rejected => "Rejected",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Position along the forward progression. Used to keep recomputation
    /// from ever moving an application backwards.
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::ReadyForAssignment => 1,
            Self::Assigned => 2,
            Self::ApplicationApproved => 3,
            Self::InProgress => 4,
            Self::Completed => 5,
            Self::Rejected => 6,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored upload metadata. A resubmission creates a new document; stored
/// documents are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub file_name: String,
    pub document_type: String,
    pub description: String,
    pub storage_ref: DocumentRef,
    pub uploaded_on: NaiveDate,
}
