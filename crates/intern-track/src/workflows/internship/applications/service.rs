use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::info;

use super::super::calendar::{self, CalendarError};
use super::super::catalog::{CatalogError, RequirementCatalog};
use super::super::domain::{
    ApplicationId, ApplicationStatus, CommissionMemberId, Document, DocumentId, RequirementId,
};
use super::super::report::ApplicationProgressReport;
use super::super::requirements::RequirementError;
use super::super::status::{next_status, StatusInputs, StatusPolicy};
use super::domain::{Application, ApplicationSubmission, ApplicationView, DocumentUpload};
use super::repository::{
    ApplicationRecord, ApplicationRepository, DocumentStore, RepositoryError, StorageError,
};

/// Service composing the requirement catalog, repository, and document store.
///
/// Every mutating operation re-reads the record, applies the requirement
/// transition, recomputes the aggregate status, and writes both back under
/// the record's version check. Losing a version race means re-reading and
/// re-applying, so of two callers deciding the same requirement exactly one
/// succeeds and the other sees the precondition error for the new state.
pub struct InternshipApplicationService<R, S> {
    catalog: Arc<Mutex<RequirementCatalog>>,
    repository: Arc<R>,
    documents: Arc<S>,
    policy: StatusPolicy,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REQUIREMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_requirement_id() -> RequirementId {
    let id = REQUIREMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequirementId(format!("req-{id:06}"))
}

fn next_document_id() -> DocumentId {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DocumentId(format!("doc-{id:06}"))
}

fn status_inputs<'a>(application: &'a Application, today: NaiveDate) -> StatusInputs<'a> {
    StatusInputs {
        requirements: &application.requirements,
        assigned: application.assigned_member.is_some(),
        ready_override: application.ready_override,
        explicitly_rejected: application.rejection_reason.is_some(),
        start_date: application.start_date,
        end_date: application.end_date,
        today,
    }
}

impl<R, S> InternshipApplicationService<R, S>
where
    R: ApplicationRepository + 'static,
    S: DocumentStore + 'static,
{
    pub fn new(
        catalog: Arc<Mutex<RequirementCatalog>>,
        repository: Arc<R>,
        documents: Arc<S>,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            catalog,
            repository,
            documents,
            policy,
        }
    }

    pub fn catalog(&self) -> Arc<Mutex<RequirementCatalog>> {
        Arc::clone(&self.catalog)
    }

    /// Open a new application: snapshot the internship type's rule templates
    /// into requirement instances (auto-approving what needs no review),
    /// derive the end date from the working-day calendar, and persist.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
        today: NaiveDate,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let (type_name, duration, requirements) = {
            let catalog = self.catalog.lock().expect("catalog mutex poisoned");
            let internship_type = catalog
                .get(&submission.internship_type)
                .ok_or_else(|| CatalogError::UnknownType(submission.internship_type.0.clone()))?;
            let requirements =
                catalog.instantiate(&submission.internship_type, next_requirement_id)?;
            (
                internship_type.name.clone(),
                internship_type.duration_working_days,
                requirements,
            )
        };

        let end_date = calendar::compute_end_date(
            submission.start_date,
            duration,
            submission.weekly_pattern,
        )?;

        let ApplicationSubmission {
            student,
            internship_type,
            workplace,
            start_date,
            weekly_pattern,
        } = submission;

        let mut application = Application {
            id: next_application_id(),
            student,
            internship_type,
            internship_type_name: type_name,
            workplace,
            start_date,
            end_date,
            weekly_pattern,
            status: ApplicationStatus::Pending,
            requirements,
            assigned_member: None,
            ready_override: false,
            rejection_reason: None,
        };
        application.status = next_status(
            application.status,
            &self.policy,
            &status_inputs(&application, today),
        );

        let record = self.repository.insert(ApplicationRecord {
            application,
            version: 0,
        })?;
        info!(
            application_id = %record.application.id.0,
            status = record.application.status.label(),
            "application submitted"
        );
        Ok(record)
    }

    /// Store the upload and attach the resulting reference to the
    /// requirement, advancing it toward review.
    pub fn upload_document(
        &self,
        application_id: &ApplicationId,
        requirement_id: &RequirementId,
        upload: DocumentUpload,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let storage_ref = self.documents.store(&upload.file_name, &upload.content)?;
        let document_id = next_document_id();

        self.mutate(application_id, today, move |application| {
            let requirement = application
                .requirement_mut(requirement_id)
                .ok_or_else(|| ApplicationServiceError::RequirementNotFound(
                    requirement_id.0.clone(),
                ))?;
            requirement.attach_upload(Document {
                id: document_id.clone(),
                file_name: upload.file_name.clone(),
                document_type: upload.document_type.clone(),
                description: upload.description.clone(),
                storage_ref: storage_ref.clone(),
                uploaded_on: today,
            })?;
            Ok(())
        })
    }

    pub fn approve_requirement(
        &self,
        application_id: &ApplicationId,
        requirement_id: &RequirementId,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let view = self.mutate(application_id, today, move |application| {
            let requirement = application
                .requirement_mut(requirement_id)
                .ok_or_else(|| ApplicationServiceError::RequirementNotFound(
                    requirement_id.0.clone(),
                ))?;
            requirement.approve()?;
            Ok(())
        })?;
        info!(
            application_id = %application_id.0,
            requirement_id = %requirement_id.0,
            status = view.status_label,
            "requirement approved"
        );
        Ok(view)
    }

    pub fn reject_requirement(
        &self,
        application_id: &ApplicationId,
        requirement_id: &RequirementId,
        reason: &str,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let view = self.mutate(application_id, today, move |application| {
            let requirement = application
                .requirement_mut(requirement_id)
                .ok_or_else(|| ApplicationServiceError::RequirementNotFound(
                    requirement_id.0.clone(),
                ))?;
            requirement.reject(reason)?;
            Ok(())
        })?;
        info!(
            application_id = %application_id.0,
            requirement_id = %requirement_id.0,
            "requirement rejected"
        );
        Ok(view)
    }

    /// Consume an assignment event from the commission assignment service.
    pub fn record_assignment(
        &self,
        application_id: &ApplicationId,
        member: CommissionMemberId,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        self.mutate(application_id, today, move |application| {
            application.assigned_member = Some(member.clone());
            Ok(())
        })
    }

    /// Explicit commission rejection of the whole application. Terminal.
    pub fn reject_application(
        &self,
        application_id: &ApplicationId,
        reason: &str,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApplicationServiceError::MissingRejectionReason);
        }
        let reason = reason.to_string();
        self.mutate(application_id, today, move |application| {
            application.rejection_reason = Some(reason.clone());
            Ok(())
        })
    }

    /// Administrative trigger used when the status policy does not advance
    /// applications to ready-for-assignment automatically.
    pub fn mark_ready_for_assignment(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        self.mutate(application_id, today, |application| {
            application.ready_override = true;
            Ok(())
        })
    }

    /// Idempotent date-crossing sweep. Persists only when the status
    /// actually moves.
    pub fn refresh_status(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        Ok(self.refreshed(application_id, today)?.application.view())
    }

    /// Read path: date-driven transitions are evaluated lazily on read.
    pub fn get(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        self.refresh_status(application_id, today)
    }

    pub fn progress(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationProgressReport, ApplicationServiceError> {
        Ok(self.refreshed(application_id, today)?.application.progress())
    }

    /// Fetch a stored document's metadata and bytes through the store.
    pub fn document(
        &self,
        application_id: &ApplicationId,
        requirement_id: &RequirementId,
        document_id: &DocumentId,
    ) -> Result<(Document, Vec<u8>), ApplicationServiceError> {
        let record = self.fetch_required(application_id)?;
        let requirement = record
            .application
            .requirement(requirement_id)
            .ok_or_else(|| ApplicationServiceError::RequirementNotFound(
                requirement_id.0.clone(),
            ))?;
        let document = requirement
            .documents
            .iter()
            .find(|d| &d.id == document_id)
            .ok_or_else(|| ApplicationServiceError::DocumentNotFound(document_id.0.clone()))?;
        let bytes = self.documents.fetch(&document.storage_ref)?;
        Ok((document.clone(), bytes))
    }

    fn fetch_required(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.repository
            .fetch(application_id)?
            .ok_or_else(|| ApplicationServiceError::ApplicationNotFound(application_id.0.clone()))
    }

    fn refreshed(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        loop {
            let record = self.fetch_required(application_id)?;
            let computed = next_status(
                record.application.status,
                &self.policy,
                &status_inputs(&record.application, today),
            );
            if computed == record.application.status {
                return Ok(record);
            }

            let mut changed = record;
            changed.application.status = computed;
            match self.repository.update(changed) {
                Ok(updated) => return Ok(updated),
                Err(RepositoryError::StaleVersion { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }
    }

    fn mutate<F>(
        &self,
        application_id: &ApplicationId,
        today: NaiveDate,
        op: F,
    ) -> Result<ApplicationView, ApplicationServiceError>
    where
        F: Fn(&mut Application) -> Result<(), ApplicationServiceError>,
    {
        loop {
            let mut record = self.fetch_required(application_id)?;
            op(&mut record.application)?;
            record.application.status = next_status(
                record.application.status,
                &self.policy,
                &status_inputs(&record.application, today),
            );
            match self.repository.update(record) {
                Ok(updated) => return Ok(updated.application.view()),
                // Lost the version race: re-read and re-apply. A
                // precondition that no longer holds surfaces as the
                // requirement-level error for the state the winner left.
                Err(RepositoryError::StaleVersion { .. }) => continue,
                Err(other) => return Err(other.into()),
            }
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Requirement(#[from] RequirementError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("application '{0}' not found")]
    ApplicationNotFound(String),
    #[error("requirement '{0}' not found on this application")]
    RequirementNotFound(String),
    #[error("document '{0}' not found on this requirement")]
    DocumentNotFound(String),
    #[error("an application rejection requires a non-empty reason")]
    MissingRejectionReason,
}
