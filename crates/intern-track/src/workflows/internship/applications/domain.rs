use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::calendar::WeeklyPattern;
use super::super::domain::{
    ApplicationId, ApplicationStatus, CommissionMemberId, Document, InternshipTypeId,
    RequirementId,
};
use super::super::report::{progress_report, ApplicationProgressReport};
use super::super::requirements::RequirementInstance;

/// The student on whose behalf an application runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

/// Where the internship takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    pub company_name: String,
    pub address: String,
    pub supervisor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_email: Option<String>,
}

/// Payload a student submits to open an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub student: StudentProfile,
    pub internship_type: InternshipTypeId,
    pub workplace: Workplace,
    pub start_date: NaiveDate,
    pub weekly_pattern: WeeklyPattern,
}

/// Payload for a document upload against one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub document_type: String,
    #[serde(default)]
    pub description: String,
    pub content: Vec<u8>,
}

/// The authoritative application aggregate.
///
/// Requirement state and the overall status change only through the service;
/// clients re-fetch (or receive the returned view) after every mutation
/// instead of patching derived state locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student: StudentProfile,
    pub internship_type: InternshipTypeId,
    pub internship_type_name: String,
    pub workplace: Workplace,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_pattern: WeeklyPattern,
    pub status: ApplicationStatus,
    pub requirements: Vec<RequirementInstance>,
    pub assigned_member: Option<CommissionMemberId>,
    pub ready_override: bool,
    pub rejection_reason: Option<String>,
}

impl Application {
    pub fn requirement(&self, id: &RequirementId) -> Option<&RequirementInstance> {
        self.requirements.iter().find(|r| &r.id == id)
    }

    pub(crate) fn requirement_mut(&mut self, id: &RequirementId) -> Option<&mut RequirementInstance> {
        self.requirements.iter_mut().find(|r| &r.id == id)
    }

    pub fn progress(&self) -> ApplicationProgressReport {
        progress_report(self.status, &self.requirements)
    }

    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            application_id: self.id.clone(),
            status: self.status,
            status_label: self.status.label(),
            student_number: self.student.student_number.clone(),
            department: self.student.department.clone(),
            internship_type: self.internship_type.clone(),
            internship_type_name: self.internship_type_name.clone(),
            company_name: self.workplace.company_name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            weekly_pattern: self.weekly_pattern,
            weekly_pattern_label: self.weekly_pattern.label(),
            assigned_member: self.assigned_member.clone(),
            rejection_reason: self.rejection_reason.clone(),
            requirements: self.requirements.iter().map(requirement_view).collect(),
        }
    }
}

/// Serialized snapshot of an application for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub student_number: String,
    pub department: String,
    pub internship_type: InternshipTypeId,
    pub internship_type_name: String,
    pub company_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_pattern: WeeklyPattern,
    pub weekly_pattern_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_member: Option<CommissionMemberId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub requirements: Vec<RequirementView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementView {
    pub requirement_id: RequirementId,
    pub name: String,
    pub description: String,
    pub kind: &'static str,
    pub stage: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accepted_document_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub documents: Vec<DocumentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub document_id: String,
    pub file_name: String,
    pub document_type: String,
    pub description: String,
    pub uploaded_on: NaiveDate,
}

fn requirement_view(requirement: &RequirementInstance) -> RequirementView {
    RequirementView {
        requirement_id: requirement.id.clone(),
        name: requirement.name.clone(),
        description: requirement.description.clone(),
        kind: requirement.kind.label(),
        stage: requirement.stage.label(),
        status: requirement.status.label(),
        accepted_document_types: requirement.accepted_document_types.clone(),
        rejection_reason: requirement.rejection_reason.clone(),
        documents: requirement.documents.iter().map(document_view).collect(),
    }
}

fn document_view(document: &Document) -> DocumentView {
    DocumentView {
        document_id: document.id.0.clone(),
        file_name: document.file_name.clone(),
        document_type: document.document_type.clone(),
        description: document.description.clone(),
        uploaded_on: document.uploaded_on,
    }
}
