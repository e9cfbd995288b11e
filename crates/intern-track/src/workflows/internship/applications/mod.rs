//! Application intake, requirement tracking, and lifecycle service.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationSubmission, ApplicationView, DocumentUpload, DocumentView,
    RequirementView, StudentProfile, Workplace,
};
pub use repository::{
    ApplicationRecord, ApplicationRepository, DocumentStore, RepositoryError, StorageError,
};
pub use router::application_router;
pub use service::{ApplicationServiceError, InternshipApplicationService};
