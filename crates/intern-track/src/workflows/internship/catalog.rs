use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{InternshipTypeId, RequirementId, RequirementStatus, RuleKind, SubmissionStage};
use super::requirements::RequirementInstance;

/// Type-level definition of one thing an internship type demands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub name: String,
    pub description: String,
    pub kind: RuleKind,
    pub stage: SubmissionStage,
    /// Document-type tags a document rule accepts. Informational for topic
    /// rules.
    #[serde(default)]
    pub document_types: Vec<String>,
}

/// An internship variant (e.g. summer practice, workplace training) with its
/// required working-day count and rule templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipType {
    pub id: InternshipTypeId,
    pub name: String,
    pub description: String,
    pub duration_working_days: u32,
    templates: Vec<RuleTemplate>,
}

impl InternshipType {
    pub fn new(
        id: InternshipTypeId,
        name: impl Into<String>,
        description: impl Into<String>,
        duration_working_days: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            duration_working_days,
            templates: Vec::new(),
        }
    }

    pub fn with_templates(mut self, templates: Vec<RuleTemplate>) -> Self {
        self.templates = templates;
        self
    }

    pub fn templates(&self) -> &[RuleTemplate] {
        &self.templates
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog mismatch: unknown internship type '{0}'")]
    UnknownType(String),
    #[error("internship type '{0}' is already registered")]
    DuplicateType(String),
    #[error("rule template '{name}' already exists on internship type '{type_id}'")]
    DuplicateTemplate { type_id: String, name: String },
    #[error("rule template '{name}' not found on internship type '{type_id}'")]
    TemplateNotFound { type_id: String, name: String },
}

/// Registry of internship types and their rule templates.
///
/// Template edits only shape future instantiations; requirement instances
/// already stamped out for an application are never touched.
#[derive(Debug, Default)]
pub struct RequirementCatalog {
    types: Vec<InternshipType>,
}

impl RequirementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, internship_type: InternshipType) -> Result<(), CatalogError> {
        if self.types.iter().any(|t| t.id == internship_type.id) {
            return Err(CatalogError::DuplicateType(internship_type.id.0.clone()));
        }
        self.types.push(internship_type);
        Ok(())
    }

    pub fn get(&self, id: &InternshipTypeId) -> Option<&InternshipType> {
        self.types.iter().find(|t| &t.id == id)
    }

    pub fn types(&self) -> &[InternshipType] {
        &self.types
    }

    pub fn add_template(
        &mut self,
        type_id: &InternshipTypeId,
        template: RuleTemplate,
    ) -> Result<(), CatalogError> {
        let internship_type = self
            .types
            .iter_mut()
            .find(|t| &t.id == type_id)
            .ok_or_else(|| CatalogError::UnknownType(type_id.0.clone()))?;

        if internship_type
            .templates
            .iter()
            .any(|t| t.name == template.name)
        {
            return Err(CatalogError::DuplicateTemplate {
                type_id: type_id.0.clone(),
                name: template.name,
            });
        }

        internship_type.templates.push(template);
        Ok(())
    }

    pub fn remove_template(
        &mut self,
        type_id: &InternshipTypeId,
        name: &str,
    ) -> Result<RuleTemplate, CatalogError> {
        let internship_type = self
            .types
            .iter_mut()
            .find(|t| &t.id == type_id)
            .ok_or_else(|| CatalogError::UnknownType(type_id.0.clone()))?;

        let position = internship_type
            .templates
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| CatalogError::TemplateNotFound {
                type_id: type_id.0.clone(),
                name: name.to_string(),
            })?;

        Ok(internship_type.templates.remove(position))
    }

    /// Snapshot the type's templates into live requirement instances, one per
    /// template, resolving auto-approvable requirements on the spot.
    pub fn instantiate(
        &self,
        type_id: &InternshipTypeId,
        mut next_id: impl FnMut() -> RequirementId,
    ) -> Result<Vec<RequirementInstance>, CatalogError> {
        let internship_type = self
            .get(type_id)
            .ok_or_else(|| CatalogError::UnknownType(type_id.0.clone()))?;

        Ok(internship_type
            .templates
            .iter()
            .map(|template| RequirementInstance {
                id: next_id(),
                name: template.name.clone(),
                description: template.description.clone(),
                kind: template.kind,
                stage: template.stage,
                accepted_document_types: template.document_types.clone(),
                status: initial_status(template.kind, template.stage),
                documents: Vec::new(),
                rejection_reason: None,
            })
            .collect())
    }
}

/// Auto-approval policy, applied synchronously during instantiation.
///
/// A topic confirmed at application time needs no review and no upload, so
/// it is born approved. A topic evaluated during the internship (e.g. the
/// journal topic) and every document rule start out waiting.
pub const fn initial_status(kind: RuleKind, stage: SubmissionStage) -> RequirementStatus {
    match (kind, stage) {
        (RuleKind::Topic, SubmissionStage::Application) => RequirementStatus::Approved,
        _ => RequirementStatus::WaitingForUpload,
    }
}
