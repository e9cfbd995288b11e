use super::common::*;
use crate::workflows::internship::domain::{
    Document, DocumentId, DocumentRef, InternshipTypeId, RequirementId, RequirementStatus,
};
use crate::workflows::internship::{RequirementCatalog, RequirementError, RequirementInstance};

fn instances() -> Vec<RequirementInstance> {
    let mut catalog = RequirementCatalog::new();
    catalog.register_type(summer_practice()).expect("register");
    let mut counter = 0u32;
    catalog
        .instantiate(&InternshipTypeId("type-summer-1".to_string()), move || {
            counter += 1;
            RequirementId(format!("test-req-{counter}"))
        })
        .expect("known type")
}

fn instance(name: &str) -> RequirementInstance {
    instances()
        .into_iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("instance '{name}' present"))
}

fn document(file_name: &str) -> Document {
    Document {
        id: DocumentId(format!("test-doc-{file_name}")),
        file_name: file_name.to_string(),
        document_type: "acceptance_form".to_string(),
        description: String::new(),
        storage_ref: DocumentRef(format!("mem://test/{file_name}")),
        uploaded_on: today(),
    }
}

#[test]
fn upload_advances_a_waiting_document_requirement() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");
    assert_eq!(acceptance.status, RequirementStatus::WaitingForApproval);
    assert_eq!(acceptance.documents.len(), 1);
}

#[test]
fn upload_on_a_topic_requirement_is_invalid() {
    let mut confirmation = instance("Journal Topic Confirmation");
    let error = confirmation
        .attach_upload(document("confirmation.pdf"))
        .unwrap_err();
    assert!(matches!(error, RequirementError::InvalidRuleType { .. }));
    assert_eq!(confirmation.status, RequirementStatus::WaitingForUpload);
    assert!(confirmation.documents.is_empty());
}

#[test]
fn upload_on_an_approved_requirement_is_refused() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");
    acceptance.approve().expect("pending review");

    let error = acceptance
        .attach_upload(document("acceptance-v2.pdf"))
        .unwrap_err();
    assert_eq!(
        error,
        RequirementError::NotAwaitingUpload {
            id: acceptance.id.0.clone(),
            status: RequirementStatus::Approved,
        }
    );
    assert_eq!(acceptance.documents.len(), 1);
}

#[test]
fn upload_while_pending_review_adds_a_document_without_a_transition() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");
    acceptance
        .attach_upload(document("acceptance-corrected.pdf"))
        .expect("replacement accepted");
    assert_eq!(acceptance.status, RequirementStatus::WaitingForApproval);
    assert_eq!(acceptance.documents.len(), 2);
}

#[test]
fn second_approval_surfaces_the_race() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");
    acceptance.approve().expect("first approval succeeds");

    let error = acceptance.approve().unwrap_err();
    assert_eq!(
        error,
        RequirementError::AlreadyDecided {
            id: acceptance.id.0.clone(),
            status: RequirementStatus::Approved,
        }
    );
}

#[test]
fn approving_a_document_requirement_before_upload_is_refused() {
    let mut transcript = instance("Transcript");
    let error = transcript.approve().unwrap_err();
    assert_eq!(
        error,
        RequirementError::NotPending {
            id: transcript.id.0.clone(),
            status: RequirementStatus::WaitingForUpload,
        }
    );
}

#[test]
fn rejection_requires_a_reason_and_leaves_state_untouched() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");

    let error = acceptance.reject("   ").unwrap_err();
    assert_eq!(error, RequirementError::MissingReason);
    assert_eq!(acceptance.status, RequirementStatus::WaitingForApproval);
    assert!(acceptance.rejection_reason.is_none());
}

#[test]
fn resubmission_after_rejection_clears_the_reason() {
    let mut acceptance = instance("Internship Acceptance Form");
    acceptance
        .attach_upload(document("acceptance.pdf"))
        .expect("upload accepted");
    acceptance
        .reject("missing company stamp")
        .expect("pending review");
    assert_eq!(acceptance.status, RequirementStatus::Rejected);
    assert_eq!(
        acceptance.rejection_reason.as_deref(),
        Some("missing company stamp")
    );

    acceptance
        .attach_upload(document("acceptance-stamped.pdf"))
        .expect("resubmission accepted");
    assert_eq!(acceptance.status, RequirementStatus::WaitingForApproval);
    assert!(acceptance.rejection_reason.is_none());
    assert_eq!(acceptance.documents.len(), 2);
}

#[test]
fn submission_topics_are_decided_without_an_upload() {
    let mut confirmation = instance("Journal Topic Confirmation");
    assert_eq!(confirmation.status, RequirementStatus::WaitingForUpload);
    confirmation.approve().expect("commission decides directly");
    assert_eq!(confirmation.status, RequirementStatus::Approved);
}

#[test]
fn rejected_submission_topics_can_be_reconsidered() {
    let mut confirmation = instance("Journal Topic Confirmation");
    confirmation
        .reject("topic overlaps an earlier internship")
        .expect("decidable");
    assert_eq!(confirmation.status, RequirementStatus::Rejected);

    confirmation.approve().expect("reconsidered");
    assert_eq!(confirmation.status, RequirementStatus::Approved);
    assert!(confirmation.rejection_reason.is_none());
}
