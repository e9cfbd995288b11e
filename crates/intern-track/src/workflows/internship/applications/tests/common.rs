use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::internship::applications::repository::{
    ApplicationRecord, ApplicationRepository, DocumentStore, RepositoryError, StorageError,
};
use crate::workflows::internship::applications::{
    application_router, ApplicationSubmission, DocumentUpload, InternshipApplicationService,
    StudentProfile, Workplace,
};
use crate::workflows::internship::calendar::WeeklyPattern;
use crate::workflows::internship::commission::{RoleSessions, SessionError};
use crate::workflows::internship::domain::{
    ApplicationId, ApplicationStatus, CommissionMemberId, DocumentRef, InternshipTypeId,
    RequirementId, RuleKind, SubmissionStage,
};
use crate::workflows::internship::{
    InternshipType, RequirementCatalog, RuleTemplate, StatusPolicy,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A date before the sample application's start date.
pub(super) fn today() -> NaiveDate {
    date(2025, 5, 20)
}

pub(super) fn summer_practice() -> InternshipType {
    InternshipType::new(
        InternshipTypeId("type-summer-1".to_string()),
        "Summer Practice I",
        "First mandatory summer internship for engineering students.",
        20,
    )
    .with_templates(vec![
        RuleTemplate {
            name: "Internship Acceptance Form".to_string(),
            description: "Acceptance form signed by the company.".to_string(),
            kind: RuleKind::Document,
            stage: SubmissionStage::Application,
            document_types: vec!["acceptance_form".to_string()],
        },
        RuleTemplate {
            name: "Transcript".to_string(),
            description: "Current transcript of records.".to_string(),
            kind: RuleKind::Document,
            stage: SubmissionStage::Application,
            document_types: vec!["transcript".to_string()],
        },
        RuleTemplate {
            name: "Internship Topic".to_string(),
            description: "Topic declared on the application form.".to_string(),
            kind: RuleKind::Topic,
            stage: SubmissionStage::Application,
            document_types: Vec::new(),
        },
        RuleTemplate {
            name: "Internship Journal".to_string(),
            description: "Daily journal kept during the internship.".to_string(),
            kind: RuleKind::Document,
            stage: SubmissionStage::Submission,
            document_types: vec!["journal".to_string()],
        },
        RuleTemplate {
            name: "Journal Topic Confirmation".to_string(),
            description: "Commission confirmation of the journal topic.".to_string(),
            kind: RuleKind::Topic,
            stage: SubmissionStage::Submission,
            document_types: Vec::new(),
        },
    ])
}

pub(super) fn catalog() -> Arc<Mutex<RequirementCatalog>> {
    let mut catalog = RequirementCatalog::new();
    catalog
        .register_type(summer_practice())
        .expect("fresh catalog accepts the type");
    Arc::new(Mutex::new(catalog))
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        student: StudentProfile {
            student_number: "2021556021".to_string(),
            full_name: "Ayse Yilmaz".to_string(),
            email: "ayse.yilmaz@example.edu".to_string(),
            department: "Computer Engineering".to_string(),
        },
        internship_type: InternshipTypeId("type-summer-1".to_string()),
        workplace: Workplace {
            company_name: "Delta Software".to_string(),
            address: "Teknopark 42, Istanbul".to_string(),
            supervisor_name: "Murat Kaya".to_string(),
            supervisor_email: Some("murat.kaya@delta.example".to_string()),
        },
        start_date: date(2025, 6, 2),
        weekly_pattern: WeeklyPattern::FiveDays,
    }
}

pub(super) fn upload(file_name: &str, document_type: &str) -> DocumentUpload {
    DocumentUpload {
        file_name: file_name.to_string(),
        document_type: document_type.to_string(),
        description: String::new(),
        content: b"stamped and signed".to_vec(),
    }
}

pub(super) fn build_service() -> (
    InternshipApplicationService<MemoryRepository, MemoryDocuments>,
    Arc<MemoryRepository>,
    Arc<MemoryDocuments>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let documents = Arc::new(MemoryDocuments::default());
    let service = InternshipApplicationService::new(
        catalog(),
        repository.clone(),
        documents.clone(),
        StatusPolicy::default(),
    );
    (service, repository, documents)
}

pub(super) fn requirement_named(record: &ApplicationRecord, name: &str) -> RequirementId {
    record
        .application
        .requirements
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.id.clone())
        .unwrap_or_else(|| panic!("requirement '{name}' present"))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&record.application.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::StaleVersion {
                expected: record.version,
                found: stored.version,
            });
        }
        let bumped = ApplicationRecord {
            application: record.application,
            version: record.version + 1,
        };
        guard.insert(bumped.application.id.clone(), bumped.clone());
        Ok(bumped)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut pending: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| {
                matches!(
                    record.application.status,
                    ApplicationStatus::Pending | ApplicationStatus::ReadyForAssignment
                )
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.application.id.0.cmp(&b.application.id.0));
        pending.truncate(limit);
        Ok(pending)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDocuments {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    sequence: Arc<AtomicU64>,
}

impl DocumentStore for MemoryDocuments {
    fn store(&self, file_name: &str, content: &[u8]) -> Result<DocumentRef, StorageError> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let key = format!("mem://{n}/{file_name}");
        self.files
            .lock()
            .expect("store mutex poisoned")
            .insert(key.clone(), content.to_vec());
        Ok(DocumentRef(key))
    }

    fn fetch(&self, reference: &DocumentRef) -> Result<Vec<u8>, StorageError> {
        self.files
            .lock()
            .expect("store mutex poisoned")
            .get(&reference.0)
            .cloned()
            .ok_or_else(|| StorageError::Missing(reference.0.clone()))
    }
}

impl MemoryDocuments {
    pub(super) fn stored_count(&self) -> usize {
        self.files.lock().expect("store mutex poisoned").len()
    }
}

pub(super) struct UnavailableDocuments;

impl DocumentStore for UnavailableDocuments {
    fn store(&self, _file_name: &str, _content: &[u8]) -> Result<DocumentRef, StorageError> {
        Err(StorageError::Unavailable("object store offline".to_string()))
    }

    fn fetch(&self, _reference: &DocumentRef) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::Unavailable("object store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingSessions {
    invalidated: Mutex<Vec<CommissionMemberId>>,
}

impl RecordingSessions {
    pub(super) fn invalidated(&self) -> Vec<CommissionMemberId> {
        self.invalidated
            .lock()
            .expect("session mutex poisoned")
            .clone()
    }
}

impl RoleSessions for RecordingSessions {
    fn invalidate(&self, member: &CommissionMemberId) -> Result<(), SessionError> {
        self.invalidated
            .lock()
            .expect("session mutex poisoned")
            .push(member.clone());
        Ok(())
    }
}

pub(super) fn router_with_service(
    service: InternshipApplicationService<MemoryRepository, MemoryDocuments>,
) -> axum::Router {
    application_router(Arc::new(service))
}
