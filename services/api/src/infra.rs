use chrono::NaiveDate;
use intern_track::workflows::internship::applications::{
    ApplicationRecord, ApplicationRepository, DocumentStore, RepositoryError, StorageError,
};
use intern_track::workflows::internship::commission::{
    CommissionMember, CommissionRole, CommissionRoster, RoleSessions, SessionError,
};
use intern_track::workflows::internship::domain::{
    ApplicationId, ApplicationStatus, CommissionMemberId, DocumentRef, InternshipTypeId, RuleKind,
    SubmissionStage,
};
use intern_track::workflows::internship::{
    InternshipType, RequirementCatalog, RuleTemplate, StatusPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
pub(crate) struct InMemoryDocumentStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    sequence: Arc<AtomicU64>,
}

impl DocumentStore for InMemoryDocumentStore {
    fn store(&self, file_name: &str, content: &[u8]) -> Result<DocumentRef, StorageError> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let key = format!("mem://uploads/{n}/{file_name}");
        self.files
            .lock()
            .expect("document store mutex poisoned")
            .insert(key.clone(), content.to_vec());
        Ok(DocumentRef(key))
    }

    fn fetch(&self, reference: &DocumentRef) -> Result<Vec<u8>, StorageError> {
        self.files
            .lock()
            .expect("document store mutex poisoned")
            .get(&reference.0)
            .cloned()
            .ok_or_else(|| StorageError::Missing(reference.0.clone()))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryRoleSessions {
    invalidated: Mutex<Vec<CommissionMemberId>>,
}

impl InMemoryRoleSessions {
    pub(crate) fn invalidated(&self) -> Vec<CommissionMemberId> {
        self.invalidated
            .lock()
            .expect("session mutex poisoned")
            .clone()
    }
}

impl RoleSessions for InMemoryRoleSessions {
    fn invalidate(&self, member: &CommissionMemberId) -> Result<(), SessionError> {
        self.invalidated
            .lock()
            .expect("session mutex poisoned")
            .push(member.clone());
        Ok(())
    }
}

pub(crate) fn default_status_policy() -> StatusPolicy {
    StatusPolicy::default()
}

/// Catalog seeded with the engineering faculty's two internship variants.
pub(crate) fn standard_catalog() -> RequirementCatalog {
    let mut catalog = RequirementCatalog::new();

    let summer = InternshipType::new(
        InternshipTypeId("summer-practice-1".to_string()),
        "Summer Practice I",
        "First mandatory summer internship.",
        20,
    )
    .with_templates(vec![
        RuleTemplate {
            name: "Internship Acceptance Form".to_string(),
            description: "Acceptance form signed and stamped by the company.".to_string(),
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
    ]);

    let training = InternshipType::new(
        InternshipTypeId("workplace-training".to_string()),
        "Workplace Training",
        "Long-term workplace training in the final year.",
        40,
    )
    .with_templates(vec![
        RuleTemplate {
            name: "Training Agreement".to_string(),
            description: "Tripartite agreement signed by all parties.".to_string(),
            kind: RuleKind::Document,
            stage: SubmissionStage::Application,
            document_types: vec!["agreement".to_string()],
        },
        RuleTemplate {
            name: "Training Topic".to_string(),
            description: "Topic declared on the application form.".to_string(),
            kind: RuleKind::Topic,
            stage: SubmissionStage::Application,
            document_types: Vec::new(),
        },
        RuleTemplate {
            name: "Weekly Reports".to_string(),
            description: "Weekly progress reports signed by the supervisor.".to_string(),
            kind: RuleKind::Document,
            stage: SubmissionStage::Submission,
            document_types: vec!["report".to_string()],
        },
    ]);

    catalog.register_type(summer).expect("fresh catalog");
    catalog.register_type(training).expect("fresh catalog");
    catalog
}

/// Roster seeded with a department commission for local runs.
pub(crate) fn standard_roster() -> CommissionRoster {
    let mut roster = CommissionRoster::new();
    let members = [
        ("cm-demir", "Prof. A. Demir", CommissionRole::Chairman),
        ("cm-aksoy", "Dr. B. Aksoy", CommissionRole::Member),
        ("cm-polat", "Dr. C. Polat", CommissionRole::Member),
    ];
    for (id, name, role) in members {
        roster
            .add_member(CommissionMember {
                id: CommissionMemberId(id.to_string()),
                full_name: name.to_string(),
                department: "Computer Engineering".to_string(),
                role,
            })
            .expect("fresh roster");
    }
    roster
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
